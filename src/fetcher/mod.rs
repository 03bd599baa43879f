//! Media fetching (resolve, download, transcode)
//!
//! The core abstraction is the [`MediaFetcher`] trait. Implementations:
//!
//! - [`CliMediaFetcher`]: drives the external `yt-dlp` binary
//! - [`UnavailableFetcher`]: stub used when yt-dlp cannot be found
//!
//! Tests and embedders can supply their own implementation through
//! [`MusicDownloader::with_fetcher`](crate::MusicDownloader::with_fetcher).

mod cli;
mod traits;
mod unavailable;

pub use cli::{AUDIO_FORMATS, CliMediaFetcher};
pub use traits::{FetcherCapabilities, MediaFetcher};
pub use unavailable::UnavailableFetcher;

use crate::config::ToolsConfig;
use crate::utils::sanitize_filename;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Placeholder a fetcher replaces with the extension of the file it writes
pub const EXT_PLACEHOLDER: &str = "%(ext)s";

/// Output template for a title: `folder/{sanitized}.%(ext)s`
pub fn output_template(folder: &Path, title: &str) -> PathBuf {
    folder.join(format!("{}.{}", sanitize_filename(title), EXT_PLACEHOLDER))
}

/// Replace the extension placeholder of a template
pub fn render_template(template: &Path, ext: &str) -> PathBuf {
    PathBuf::from(
        template
            .to_string_lossy()
            .replace(EXT_PLACEHOLDER, ext),
    )
}

/// Pick the fetcher for a tools configuration
///
/// Uses yt-dlp when it is configured or found on PATH, and falls back to
/// [`UnavailableFetcher`] otherwise.
pub fn fetcher_from_config(tools: &ToolsConfig) -> Arc<dyn MediaFetcher> {
    let fetcher: Arc<dyn MediaFetcher> = match CliMediaFetcher::from_config(tools) {
        Some(cli) => Arc::new(cli),
        None => {
            tracing::warn!("yt-dlp not found; downloads will fail until it is installed");
            Arc::new(UnavailableFetcher)
        }
    };

    let caps = fetcher.capabilities();
    tracing::info!(
        fetcher = fetcher.name(),
        can_fetch = caps.can_fetch,
        can_transcode = caps.can_transcode,
        "Media fetcher initialized"
    );
    fetcher
}
