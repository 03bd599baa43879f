//! Shared test helpers: a file-writing stub fetcher, a stub track lister and
//! a ready-made MusicDownloader.

use crate::config::Config;
use crate::downloader::MusicDownloader;
use crate::error::{Error, Result};
use crate::fetcher::{FetcherCapabilities, MediaFetcher, render_template};
use crate::playlist::TrackLister;
use crate::types::{FetchOutcome, ProbeInfo, TrackLimit};
use crate::utils::file_extension;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::tempdir;

/// How the stub should behave for one query
#[derive(Clone, Debug, Default)]
pub(crate) enum StubBehavior {
    /// Probe and fetch succeed; the file lands at the template path
    #[default]
    Ok,
    /// Probe fails with a resolution error
    Unresolvable,
    /// Fetch fails with a fetch error
    FetchFails,
    /// Fetch "succeeds" but writes nothing
    NoFile,
    /// Fetch writes `{title} [id].{ext}` instead of the template path
    Renamed,
    /// Probe returns no title
    Untitled,
    /// Probe returns no title; fetch reports this one
    LateTitle(String),
    /// Fetch writes the file into another directory and reports that path
    Outside(PathBuf),
}

/// MediaFetcher stub that writes small files into the output folder
#[derive(Default)]
pub(crate) struct StubFetcher {
    titles: HashMap<String, String>,
    behaviors: HashMap<String, StubBehavior>,
    delay: Option<Duration>,
    pub(crate) probes: AtomicUsize,
    pub(crate) fetches: AtomicUsize,
    running: AtomicUsize,
    pub(crate) peak: AtomicUsize,
    fetched: std::sync::Mutex<HashSet<String>>,
}

impl StubFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Resolve `query` to `title` instead of the query itself
    pub(crate) fn with_title(mut self, query: &str, title: &str) -> Self {
        self.titles.insert(query.into(), title.into());
        self
    }

    pub(crate) fn with_behavior(mut self, query: &str, behavior: StubBehavior) -> Self {
        self.behaviors.insert(query.into(), behavior);
        self
    }

    /// Make every fetch take this long
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn was_fetched(&self, query: &str) -> bool {
        self.fetched.lock().unwrap().contains(query)
    }

    fn behavior(&self, query: &str) -> StubBehavior {
        self.behaviors.get(query).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl MediaFetcher for StubFetcher {
    async fn probe(&self, query: &str) -> Result<ProbeInfo> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        match self.behavior(query) {
            StubBehavior::Unresolvable => Err(Error::Resolution(format!("no match for {query:?}"))),
            StubBehavior::Untitled | StubBehavior::LateTitle(_) => Ok(ProbeInfo { title: None }),
            _ => Ok(ProbeInfo {
                title: Some(
                    self.titles
                        .get(query)
                        .cloned()
                        .unwrap_or_else(|| query.to_string()),
                ),
            }),
        }
    }

    async fn fetch(
        &self,
        query: &str,
        target_template: &Path,
        format: &str,
    ) -> Result<FetchOutcome> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.running.fetch_sub(1, Ordering::SeqCst);
        self.fetched.lock().unwrap().insert(query.to_string());

        let ext = file_extension(format);
        let target = render_template(target_template, ext);
        match self.behavior(query) {
            StubBehavior::FetchFails => Err(Error::Fetch("HTTP Error 403: Forbidden".into())),
            StubBehavior::NoFile => Ok(FetchOutcome {
                resolved_title: None,
                output_path: Some(target),
            }),
            StubBehavior::Renamed => {
                let stem = target.file_stem().unwrap().to_string_lossy().into_owned();
                let renamed = target.with_file_name(format!("{stem} [x1y2z3].{ext}"));
                tokio::fs::write(&renamed, query.as_bytes()).await?;
                Ok(FetchOutcome {
                    resolved_title: Some(stem),
                    output_path: None,
                })
            }
            StubBehavior::Outside(dir) => {
                let elsewhere = dir.join(target.file_name().unwrap());
                tokio::fs::write(&elsewhere, query.as_bytes()).await?;
                Ok(FetchOutcome {
                    resolved_title: None,
                    output_path: Some(elsewhere),
                })
            }
            StubBehavior::LateTitle(title) => {
                tokio::fs::write(&target, query.as_bytes()).await?;
                Ok(FetchOutcome {
                    resolved_title: Some(title),
                    output_path: Some(target),
                })
            }
            _ => {
                tokio::fs::write(&target, query.as_bytes()).await?;
                Ok(FetchOutcome {
                    resolved_title: None,
                    output_path: Some(target),
                })
            }
        }
    }

    fn capabilities(&self) -> FetcherCapabilities {
        FetcherCapabilities {
            can_fetch: true,
            can_transcode: true,
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// TrackLister stub returning a fixed list
pub(crate) struct StubTrackLister {
    pub(crate) tracks: Vec<String>,
}

impl StubTrackLister {
    pub(crate) fn new(tracks: &[&str]) -> Self {
        Self {
            tracks: tracks.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[async_trait]
impl TrackLister for StubTrackLister {
    async fn list_tracks(&self, url: &str, limit: TrackLimit) -> Result<Vec<String>> {
        crate::playlist::parse_playlist_url(url)?;
        Ok(limit.apply(self.tracks.clone()))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Config pointing at a fresh temporary output folder
pub(crate) fn test_config(temp_dir: &tempfile::TempDir) -> Config {
    let mut config = Config::default();
    config.download.output_dir = temp_dir.path().join("musics");
    config.download.max_concurrent_downloads = 3;
    config.tools.search_path = false;
    config
}

/// Helper to create a MusicDownloader around a stub fetcher.
/// Returns the downloader, the fetcher and the tempdir (which must be kept alive).
pub(crate) async fn create_test_downloader(
    fetcher: StubFetcher,
) -> (MusicDownloader, Arc<StubFetcher>, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    let config = test_config(&temp_dir);
    let fetcher = Arc::new(fetcher);

    let downloader = MusicDownloader::with_fetcher(config, fetcher.clone())
        .await
        .unwrap();

    (downloader, fetcher, temp_dir)
}
