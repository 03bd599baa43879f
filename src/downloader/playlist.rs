//! Playlist listing and playlist downloads.

use crate::error::{Error, Result};
use crate::types::{BatchResult, TrackLimit};

use super::MusicDownloader;

impl MusicDownloader {
    /// List the track names of a playlist page
    pub async fn list_playlist(&self, url: &str, limit: TrackLimit) -> Result<Vec<String>> {
        tracing::info!(url = %url, limit = %limit, lister = self.track_lister.name(), "Listing playlist");
        self.track_lister.list_tracks(url, limit).await
    }

    /// List a playlist and download every track as one batch
    ///
    /// # Errors
    ///
    /// Returns [`Error::Resolution`] when the playlist yields no tracks, plus
    /// everything [`list_playlist`](Self::list_playlist) and
    /// [`download`](Self::download) can return.
    pub async fn download_playlist(
        &self,
        url: &str,
        limit: TrackLimit,
        format: Option<&str>,
    ) -> Result<BatchResult> {
        let tracks = self.list_playlist(url, limit).await?;
        if tracks.is_empty() {
            return Err(Error::Resolution(format!("no tracks found on playlist {}", url)));
        }
        self.download(tracks, format).await
    }
}
