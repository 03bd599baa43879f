//! Fetcher and track lister fixtures that work without yt-dlp or the network

use async_trait::async_trait;
use music_dl::fetcher::render_template;
use music_dl::utils::file_extension;
use music_dl::{
    Error, FetchOutcome, FetcherCapabilities, MediaFetcher, ProbeInfo, Result, TrackLimit,
    TrackLister,
};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Fetcher that "downloads" by writing the query into the target file
///
/// Queries listed with [`DiskFetcher::failing`] fail at fetch time.
#[derive(Default)]
pub struct DiskFetcher {
    failing: HashSet<String>,
    delay: Option<Duration>,
    fetches: AtomicUsize,
    running: AtomicUsize,
    peak: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl DiskFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, queries: &[&str]) -> Self {
        self.failing = queries.iter().map(|q| q.to_string()).collect();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaFetcher for DiskFetcher {
    async fn probe(&self, query: &str) -> Result<ProbeInfo> {
        Ok(ProbeInfo {
            title: Some(query.to_string()),
        })
    }

    async fn fetch(&self, query: &str, target_template: &Path, format: &str) -> Result<FetchOutcome> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.running.fetch_sub(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(query.to_string());

        if self.failing.contains(query) {
            return Err(Error::Fetch(format!("unable to download {query}")));
        }

        let target = render_template(target_template, file_extension(format));
        tokio::fs::write(&target, query.as_bytes()).await?;
        Ok(FetchOutcome {
            resolved_title: Some(query.to_string()),
            output_path: Some(target),
        })
    }

    fn capabilities(&self) -> FetcherCapabilities {
        FetcherCapabilities {
            can_fetch: true,
            can_transcode: true,
        }
    }

    fn name(&self) -> &'static str {
        "disk"
    }
}

/// Track lister returning a fixed playlist
pub struct FixedPlaylist(pub Vec<String>);

impl FixedPlaylist {
    pub fn new(tracks: &[&str]) -> Self {
        Self(tracks.iter().map(|t| t.to_string()).collect())
    }
}

#[async_trait]
impl TrackLister for FixedPlaylist {
    async fn list_tracks(&self, _url: &str, limit: TrackLimit) -> Result<Vec<String>> {
        Ok(limit.apply(self.0.clone()))
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Sorted entry names of a zip archive
pub fn zip_entries(bytes: &[u8]) -> Vec<String> {
    let mut zip = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    let mut names: Vec<String> = (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    names
}
