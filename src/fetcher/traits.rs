//! Traits and types for media fetching

use crate::types::{FetchOutcome, ProbeInfo};
use async_trait::async_trait;
use std::path::Path;

/// Capabilities of a media fetcher implementation
#[derive(Debug, Clone, Copy)]
pub struct FetcherCapabilities {
    /// Can download items at all
    pub can_fetch: bool,
    /// Can extract/transcode audio into the requested format
    pub can_transcode: bool,
}

/// Trait for resolving, downloading and transcoding one item
///
/// Implementations can drive an external binary or provide stub
/// functionality for graceful degradation. Each call handles exactly one
/// item; the orchestrator provides the concurrency.
///
/// # Examples
///
/// ```no_run
/// use music_dl::fetcher::{CliMediaFetcher, MediaFetcher, output_template};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = CliMediaFetcher::from_path()
///     .expect("yt-dlp binary not found");
///
/// let info = fetcher.probe("Daft Punk - One More Time").await?;
/// let title = info.title.unwrap_or_else(|| "track".into());
/// let template = output_template(Path::new("musics"), &title);
/// let outcome = fetcher.fetch("Daft Punk - One More Time", &template, "mp3").await?;
/// println!("wrote {:?}", outcome.output_path);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Resolve an item without downloading it
    ///
    /// Free text is treated as a search (first match wins); URLs are used
    /// directly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Resolution`](crate::Error::Resolution) when nothing
    /// matches, or [`Error::ExternalTool`](crate::Error::ExternalTool) /
    /// [`Error::NotSupported`](crate::Error::NotSupported) when the fetcher
    /// itself cannot run.
    async fn probe(&self, query: &str) -> crate::Result<ProbeInfo>;

    /// Download an item and convert it to `format`
    ///
    /// `target_template` is the output path with the extension replaced by
    /// the [`EXT_PLACEHOLDER`](super::EXT_PLACEHOLDER); the fetcher
    /// substitutes the extension of the file it actually writes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fetch`](crate::Error::Fetch) when the download or
    /// conversion fails.
    async fn fetch(
        &self,
        query: &str,
        target_template: &Path,
        format: &str,
    ) -> crate::Result<FetchOutcome>;

    /// Query capabilities of this fetcher
    fn capabilities(&self) -> FetcherCapabilities;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
