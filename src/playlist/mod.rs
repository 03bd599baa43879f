//! Playlist track listing
//!
//! A [`TrackLister`] turns a playlist page into an ordered list of track
//! names. [`HttpTrackLister`] walks successive snapshots of the page through a
//! [`PageSource`], collecting anchors that link to `/track/` pages, until the
//! requested number of tracks is reached, a snapshot adds nothing new, or the
//! snapshot budget runs out.

mod http;

pub use http::{HttpPageSource, HttpTrackLister};

use crate::error::{Error, Result};
use crate::types::TrackLimit;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// CSS selector for anchors that point at a track page
pub const TRACK_LINK_SELECTOR: &str = r#"a[href*="/track/"]"#;

/// Trait for listing the track names of a playlist
#[async_trait]
pub trait TrackLister: Send + Sync {
    /// Names of the tracks on the playlist at `url`, in page order
    ///
    /// # Errors
    ///
    /// Returns [`Error::Playlist`] for an unusable URL or page, and
    /// [`Error::Network`] when the first page cannot be loaded.
    async fn list_tracks(&self, url: &str, limit: TrackLimit) -> Result<Vec<String>>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Source of playlist page snapshots
///
/// Snapshot `index` 0 is the initial page; later indices are "scrolled"
/// views, `seen` being the number of distinct tracks collected so far.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// HTML of one snapshot
    async fn snapshot(&self, url: &Url, index: usize, seen: usize) -> Result<String>;
}

/// A track anchor found on a page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackLink {
    /// Raw `href` attribute, used for deduplication
    pub href: String,
    /// First non-empty line of the anchor text
    pub name: String,
}

/// Extract track anchors from a page, in document order
///
/// Anchors without text are ignored.
pub fn extract_track_links(html: &str) -> Result<Vec<TrackLink>> {
    let selector = Selector::parse(TRACK_LINK_SELECTOR)
        .map_err(|e| Error::Playlist(format!("invalid track selector: {:?}", e)))?;
    let document = Html::parse_document(html);

    let links = document
        .select(&selector)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            if !href.contains("/track/") {
                return None;
            }
            let name = anchor
                .text()
                .flat_map(str::lines)
                .map(str::trim)
                .find(|line| !line.is_empty())?;
            Some(TrackLink {
                href: href.to_string(),
                name: name.to_string(),
            })
        })
        .collect();
    Ok(links)
}

/// Accumulates track names across snapshots, deduplicated by href
#[derive(Debug, Default)]
pub struct TrackCollector {
    seen: HashSet<String>,
    tracks: Vec<String>,
}

impl TrackCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the unseen links of a snapshot, stopping once `limit` is reached
    ///
    /// Returns how many new tracks were added.
    pub fn absorb(&mut self, links: Vec<TrackLink>, limit: TrackLimit) -> usize {
        let before = self.tracks.len();
        for link in links {
            if limit.is_reached(self.tracks.len()) {
                break;
            }
            if self.seen.insert(link.href) {
                self.tracks.push(link.name);
            }
        }
        self.tracks.len() - before
    }

    /// Number of distinct tracks collected
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether nothing has been collected yet
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Collected names in first-seen order
    pub fn into_tracks(self) -> Vec<String> {
        self.tracks
    }
}

/// Parse and check a playlist URL
pub fn parse_playlist_url(url: &str) -> Result<Url> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(Error::Playlist("playlist URL is empty".into()));
    }
    let parsed = Url::parse(trimmed)
        .map_err(|e| Error::Playlist(format!("invalid playlist URL {:?}: {}", trimmed, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(Error::Playlist(format!(
            "unsupported playlist URL scheme {:?}",
            scheme
        ))),
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn link(href: &str, name: &str) -> TrackLink {
        TrackLink {
            href: href.into(),
            name: name.into(),
        }
    }

    #[test]
    fn extracts_track_anchors_in_document_order() {
        let html = r#"
            <html><body>
              <a href="/album/1">Album</a>
              <a href="https://open.example.com/track/aaa"><div>First Song</div><div>Artist A</div></a>
              <a href="/artist/9">Artist</a>
              <a href="/track/bbb">
                  Second Song
                  Artist B
              </a>
              <a href="/track/ccc">   </a>
              <a>no href</a>
            </body></html>
        "#;

        let links = extract_track_links(html).unwrap();
        assert_eq!(
            links,
            vec![
                link("https://open.example.com/track/aaa", "First Song"),
                link("/track/bbb", "Second Song"),
            ]
        );
    }

    #[test]
    fn page_without_tracks_yields_nothing() {
        assert!(extract_track_links("<p>private playlist</p>").unwrap().is_empty());
    }

    #[test]
    fn collector_dedups_by_href_and_keeps_first_seen_order() {
        let mut collector = TrackCollector::new();

        let added = collector.absorb(
            vec![link("/track/1", "One"), link("/track/2", "Two")],
            TrackLimit::All,
        );
        assert_eq!(added, 2);

        // re-rendered snapshot repeats earlier anchors
        let added = collector.absorb(
            vec![
                link("/track/1", "One"),
                link("/track/2", "Two (renamed)"),
                link("/track/3", "Three"),
            ],
            TrackLimit::All,
        );
        assert_eq!(added, 1);
        assert_eq!(collector.into_tracks(), vec!["One", "Two", "Three"]);
    }

    #[test]
    fn collector_stops_at_limit() {
        let mut collector = TrackCollector::new();
        let links = (0..5).map(|i| link(&format!("/track/{i}"), &format!("T{i}")));

        collector.absorb(links.collect(), TrackLimit::Count(3));
        assert_eq!(collector.len(), 3);
    }

    #[test]
    fn same_name_different_href_is_kept_twice() {
        let mut collector = TrackCollector::new();
        collector.absorb(
            vec![link("/track/1", "Intro"), link("/track/2", "Intro")],
            TrackLimit::All,
        );
        assert_eq!(collector.into_tracks(), vec!["Intro", "Intro"]);
    }

    #[test]
    fn playlist_url_validation() {
        assert!(parse_playlist_url("https://open.example.com/playlist/x").is_ok());
        assert!(matches!(parse_playlist_url("  "), Err(Error::Playlist(_))));
        assert!(matches!(
            parse_playlist_url("not a url"),
            Err(Error::Playlist(_))
        ));
        assert!(matches!(
            parse_playlist_url("file:///etc/passwd"),
            Err(Error::Playlist(_))
        ));
    }
}
