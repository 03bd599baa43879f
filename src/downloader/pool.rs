//! Fixed-capacity worker pool shared by every batch.

use crate::error::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Bounded pool of download workers
///
/// Tasks are spawned on the tokio runtime right away and wait for one of
/// `capacity` permits before doing any work, so at most `capacity` items are
/// fetched at the same time across all batches sharing the pool.
///
/// The pool is cheap to share: wrap it in an `Arc` and hand it to several
/// [`MusicDownloader`](crate::MusicDownloader)s to give them one global limit.
#[derive(Debug)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    capacity: usize,
    accepting_new: AtomicBool,
}

impl WorkerPool {
    /// Create a pool with `capacity` workers (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
            accepting_new: AtomicBool::new(true),
        }
    }

    /// Number of workers
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of workers currently running a task
    pub fn active(&self) -> usize {
        self.capacity
            .saturating_sub(self.permits.available_permits())
    }

    /// Whether the pool has been shut down
    pub fn is_shut_down(&self) -> bool {
        !self.accepting_new.load(Ordering::SeqCst)
    }

    /// Fail with [`Error::ShuttingDown`] once the pool stopped accepting work
    pub fn ensure_accepting(&self) -> Result<()> {
        if self.is_shut_down() {
            return Err(Error::ShuttingDown);
        }
        Ok(())
    }

    /// Spawn a task that runs once a worker is free
    ///
    /// Resolves to `Err(Error::ShuttingDown)` if the pool shuts down before
    /// the task got a worker. Tasks that already hold a worker run to the end.
    pub fn spawn<F>(&self, task: F) -> Result<JoinHandle<Result<F::Output>>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.ensure_accepting()?;
        let permits = Arc::clone(&self.permits);
        Ok(tokio::spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|_| Error::ShuttingDown)?;
            Ok(task.await)
        }))
    }

    /// Stop accepting tasks and release waiting ones
    ///
    /// Idempotent. Returns `true` the first time it is called.
    pub fn shutdown(&self) -> bool {
        let was_accepting = self.accepting_new.swap(false, Ordering::SeqCst);
        self.permits.close();
        was_accepting
    }

    /// Wait until no worker is busy, or until `timeout` elapses
    ///
    /// Returns `true` when the pool drained in time.
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        let drained = async {
            loop {
                let active = self.active();
                if active == 0 {
                    return;
                }
                tracing::debug!(active, "Waiting for active downloads to complete");
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        };
        tokio::time::timeout(timeout, drained).await.is_ok()
    }
}
