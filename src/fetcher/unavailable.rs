//! Fetcher used when no download backend is available

use super::traits::{FetcherCapabilities, MediaFetcher};
use crate::types::{FetchOutcome, ProbeInfo};
use async_trait::async_trait;
use std::path::Path;

/// Media fetcher used when yt-dlp cannot be found
///
/// Every call returns `Error::NotSupported`, so each item of a batch fails
/// with a clear message instead of the server refusing to start.
///
/// # Examples
///
/// ```
/// use music_dl::fetcher::{MediaFetcher, UnavailableFetcher};
///
/// # #[tokio::main]
/// # async fn main() {
/// let fetcher = UnavailableFetcher;
/// assert!(fetcher.probe("Song One").await.is_err());
/// assert!(!fetcher.capabilities().can_fetch);
/// # }
/// ```
pub struct UnavailableFetcher;

const MISSING_BINARY: &str = "downloading requires the yt-dlp binary. \
     Configure ytdlp_path in config or ensure yt-dlp is in PATH.";

#[async_trait]
impl MediaFetcher for UnavailableFetcher {
    async fn probe(&self, _query: &str) -> crate::Result<ProbeInfo> {
        Err(crate::Error::NotSupported(MISSING_BINARY.into()))
    }

    async fn fetch(
        &self,
        _query: &str,
        _target_template: &Path,
        _format: &str,
    ) -> crate::Result<FetchOutcome> {
        Err(crate::Error::NotSupported(MISSING_BINARY.into()))
    }

    fn capabilities(&self) -> FetcherCapabilities {
        FetcherCapabilities {
            can_fetch: false,
            can_transcode: false,
        }
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}
