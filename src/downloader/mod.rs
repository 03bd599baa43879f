//! Core downloader implementation split into focused submodules.
//!
//! The `MusicDownloader` struct and its methods are organized by domain:
//! - [`batch`] - Batch validation, dispatch and aggregation
//! - [`playlist`] - Playlist listing and playlist downloads
//! - [`lifecycle`] - Shutdown coordination
//! - [`pool`] - The shared worker pool
//! - [`download_task`] - Single-item stage machine

mod batch;
mod download_task;
mod lifecycle;
mod playlist;
mod pool;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use download_task::{DEFAULT_TITLE, reconcile_output};
pub use pool::WorkerPool;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetcher::{MediaFetcher, fetcher_from_config};
use crate::playlist::{HttpTrackLister, TrackLister};
use crate::types::{Capabilities, Event, FetcherCapabilitiesInfo};
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct MusicDownloader {
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Media fetcher (trait object for pluggable implementations)
    pub(crate) fetcher: Arc<dyn MediaFetcher>,
    /// Playlist track lister
    pub(crate) track_lister: Arc<dyn TrackLister>,
    /// Worker pool shared by every batch
    pub(crate) pool: Arc<WorkerPool>,
    /// Next batch ID
    pub(crate) next_batch_id: Arc<AtomicU64>,
}

impl MusicDownloader {
    /// Create a new MusicDownloader instance
    ///
    /// This initializes all core components:
    /// - Validates the configuration
    /// - Creates the output folder
    /// - Picks the media fetcher (yt-dlp, or a stub when it is missing)
    /// - Creates the worker pool and the event broadcast channel
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the output folder
    /// cannot be created.
    pub async fn new(config: Config) -> Result<Self> {
        let fetcher = fetcher_from_config(&config.tools);
        Self::with_fetcher(config, fetcher).await
    }

    /// Create a MusicDownloader around a specific media fetcher
    pub async fn with_fetcher(config: Config, fetcher: Arc<dyn MediaFetcher>) -> Result<Self> {
        config.validate()?;

        let output_dir = config.output_dir();
        tokio::fs::create_dir_all(output_dir).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create output directory '{}': {}",
                    output_dir.display(),
                    e
                ),
            ))
        })?;

        // Create broadcast channel with buffer size of 1000 events
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

        let track_lister: Arc<dyn TrackLister> =
            Arc::new(HttpTrackLister::from_config(&config.playlist)?);
        let pool = Arc::new(WorkerPool::new(config.download.max_concurrent_downloads));

        tracing::info!(
            output_dir = %output_dir.display(),
            workers = pool.capacity(),
            fetcher = fetcher.name(),
            "Music downloader initialized"
        );

        Ok(Self {
            event_tx,
            config: Arc::new(config),
            fetcher,
            track_lister,
            pool,
            next_batch_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Share an existing worker pool instead of the one created from config
    ///
    /// Downloaders sharing a pool share its concurrency limit.
    pub fn with_pool(mut self, pool: Arc<WorkerPool>) -> Self {
        self.pool = pool;
        self
    }

    /// Replace the playlist track lister
    pub fn with_track_lister(mut self, track_lister: Arc<dyn TrackLister>) -> Self {
        self.track_lister = track_lister;
        self
    }

    /// Subscribe to download events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events independently.
    /// Events are buffered, but if a subscriber falls behind by more than 1000 events,
    /// it will receive a `RecvError::Lagged` error.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use music_dl::{MusicDownloader, Config};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let downloader = MusicDownloader::new(Config::default()).await?;
    ///
    ///     let mut events = downloader.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             tracing::info!(?event, "download event");
    ///         }
    ///     });
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// The worker pool used by this downloader
    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Query the current system capabilities
    pub fn capabilities(&self) -> Capabilities {
        let caps = self.fetcher.capabilities();

        Capabilities {
            fetcher: FetcherCapabilitiesInfo {
                can_fetch: caps.can_fetch,
                can_transcode: caps.can_transcode,
                handler: self.fetcher.name().to_string(),
            },
            max_concurrent_downloads: self.pool.capacity(),
            default_format: self.config.download.default_format.clone(),
        }
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers, the event is silently dropped.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Spawn the REST API server in a background task
    ///
    /// The server listens on the configured bind address (default: 127.0.0.1:8000).
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let downloader = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(downloader, config).await })
    }
}
