//! # music-dl
//!
//! Batch music downloader with a REST API.
//!
//! Given song titles, URLs or a playlist page, music-dl resolves each item to
//! a streaming source, downloads and transcodes the audio through yt-dlp, and
//! hands back either the single audio file or a zip archive of the output
//! folder.
//!
//! ## Design
//!
//! - **Bounded concurrency** - every batch runs on one shared worker pool
//! - **Isolated failures** - a failing item never aborts its siblings
//! - **Idempotent** - items whose file already exists are not fetched again
//! - **Pluggable** - the media fetcher and the playlist lister are traits
//! - **Event-driven** - consumers subscribe to batch and item events
//!
//! ## Quick Start
//!
//! ```no_run
//! use music_dl::{Config, MusicDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = MusicDownloader::new(Config::default()).await?;
//!
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let batch = downloader
//!         .download(vec!["Song One".into(), "Song Two".into()], Some("mp3"))
//!         .await?;
//!     println!("{}: {:?}", batch.message, batch.output_path);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Zip bundling of the output folder
pub mod archive;
/// Configuration types
pub mod config;
/// Core downloader implementation (decomposed into focused submodules)
pub mod downloader;
/// Error types
pub mod error;
/// Media fetching through yt-dlp
pub mod fetcher;
/// Playlist track listing
pub mod playlist;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::{ApiConfig, Config, DownloadConfig, PlaylistConfig, ToolsConfig};
pub use downloader::{MusicDownloader, WorkerPool};
pub use error::{ApiError, Error, ErrorDetail, Result, ToHttpStatus};
pub use fetcher::{CliMediaFetcher, FetcherCapabilities, MediaFetcher, UnavailableFetcher};
pub use playlist::{HttpTrackLister, TrackLister};
pub use types::{
    BatchId, BatchResult, Capabilities, DownloadRequest, DownloadResult, Event, FetchOutcome,
    ProbeInfo, TaskStage, TrackLimit,
};

/// Serve the REST API until a termination signal, then shut down gracefully.
///
/// The server stops accepting connections first, then the downloader's
/// [`shutdown`](MusicDownloader::shutdown) lets running items finish.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use music_dl::{Config, MusicDownloader, run_with_shutdown};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let downloader = Arc::new(MusicDownloader::new(Config::default()).await?);
///     run_with_shutdown(downloader).await?;
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(downloader: std::sync::Arc<MusicDownloader>) -> Result<()> {
    let config = downloader.get_config();
    api::serve_with_shutdown(downloader.clone(), config, wait_for_signal()).await?;
    downloader.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments (containers, tests)
    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM signal"),
                _ = sigint.recv() => tracing::info!("Received SIGINT signal (Ctrl+C)"),
            }
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, falling back to ctrl_c");
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Received SIGINT signal (Ctrl+C)"),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for Ctrl+C signal, running until killed");
                    std::future::pending::<()>().await;
                }
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C signal"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal, running until killed");
            std::future::pending::<()>().await;
        }
    }
}
