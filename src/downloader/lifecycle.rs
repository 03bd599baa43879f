//! Shutdown coordination.

use crate::error::Result;
use crate::types::Event;

use super::MusicDownloader;

/// How long shutdown waits for running items
const SHUTDOWN_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

impl MusicDownloader {
    /// Gracefully shut down the downloader
    ///
    /// This method performs a graceful shutdown sequence:
    /// 1. Stops the worker pool from accepting new batches
    /// 2. Fails items still waiting for a worker with `ShuttingDown`
    /// 3. Waits for running items to finish with a timeout (30 seconds)
    /// 4. Emits [`Event::Shutdown`]
    ///
    /// Files already in the output folder are left in place. Calling it
    /// again is harmless.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        if !self.pool.shutdown() {
            tracing::debug!("Worker pool already shut down");
        }
        tracing::info!("Stopped accepting new downloads");

        if self.pool.wait_idle(SHUTDOWN_TIMEOUT).await {
            tracing::info!("All active downloads completed gracefully");
        } else {
            tracing::warn!(
                active = self.pool.active(),
                "Timeout waiting for downloads to complete, proceeding with shutdown"
            );
        }

        self.emit_event(Event::Shutdown);
        tracing::info!("Graceful shutdown complete");
        Ok(())
    }
}
