//! HTTP snapshot source and the paging track lister

use super::{PageSource, TrackCollector, TrackLister, extract_track_links, parse_playlist_url};
use crate::config::PlaylistConfig;
use crate::error::Result;
use crate::types::TrackLimit;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Loads snapshots over plain HTTP
///
/// The first snapshot is the playlist URL itself; later snapshots ask for the
/// next page with an `offset=<seen>` query parameter.
pub struct HttpPageSource {
    client: reqwest::Client,
}

impl HttpPageSource {
    /// Create a source with its own client
    pub fn new(user_agent: &str, page_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(page_timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Create a source around an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// URL of the snapshot after `seen` tracks
pub(crate) fn snapshot_url(url: &Url, index: usize, seen: usize) -> Url {
    if index == 0 {
        return url.clone();
    }
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "offset")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut next = url.clone();
    {
        let mut pairs = next.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        pairs.append_pair("offset", &seen.to_string());
    }
    next
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn snapshot(&self, url: &Url, index: usize, seen: usize) -> Result<String> {
        let target = snapshot_url(url, index, seen);
        tracing::debug!(url = %target, index, "Loading playlist snapshot");
        let body = self
            .client
            .get(target)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

/// Track lister that walks page snapshots until nothing new shows up
///
/// # Examples
///
/// ```no_run
/// use music_dl::config::PlaylistConfig;
/// use music_dl::playlist::{HttpTrackLister, TrackLister};
/// use music_dl::TrackLimit;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let lister = HttpTrackLister::from_config(&PlaylistConfig::default())?;
/// let tracks = lister
///     .list_tracks("https://open.spotify.com/playlist/xyz", TrackLimit::Count(10))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct HttpTrackLister<S = HttpPageSource> {
    source: S,
    max_scrolls: usize,
    scroll_wait: Duration,
}

impl HttpTrackLister<HttpPageSource> {
    /// Build an HTTP lister from the playlist configuration
    pub fn from_config(config: &PlaylistConfig) -> Result<Self> {
        let source = HttpPageSource::new(&config.user_agent, config.page_timeout)?;
        Ok(Self::new(source, config.max_scrolls, config.scroll_wait))
    }
}

impl<S: PageSource> HttpTrackLister<S> {
    /// Create a lister over any snapshot source
    pub fn new(source: S, max_scrolls: usize, scroll_wait: Duration) -> Self {
        Self {
            source,
            max_scrolls: max_scrolls.max(1),
            scroll_wait,
        }
    }
}

#[async_trait]
impl<S: PageSource> TrackLister for HttpTrackLister<S> {
    async fn list_tracks(&self, url: &str, limit: TrackLimit) -> Result<Vec<String>> {
        let url = parse_playlist_url(url)?;
        let mut collector = TrackCollector::new();

        for index in 0..self.max_scrolls {
            if index > 0 && !self.scroll_wait.is_zero() {
                tokio::time::sleep(self.scroll_wait).await;
            }

            let html = match self.source.snapshot(&url, index, collector.len()).await {
                Ok(html) => html,
                Err(e) if index == 0 => return Err(e),
                Err(e) => {
                    tracing::warn!(url = %url, index, error = %e, "Playlist snapshot failed, keeping tracks found so far");
                    break;
                }
            };

            let added = collector.absorb(extract_track_links(&html)?, limit);
            tracing::debug!(url = %url, index, added, total = collector.len(), "Playlist snapshot parsed");

            if limit.is_reached(collector.len()) || added == 0 {
                break;
            }
        }

        let tracks = limit.apply(collector.into_tracks());
        tracing::info!(url = %url, tracks = tracks.len(), limit = %limit, "Playlist listed");
        Ok(tracks)
    }

    fn name(&self) -> &'static str {
        "http-snapshots"
    }
}
