//! Core types for music-dl

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use utoipa::ToSchema;

/// Identifier assigned to each batch handed to the orchestrator
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct BatchId(pub u64);

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One item dispatched to a worker
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DownloadRequest {
    /// Search query or direct URL
    pub item: String,
    /// Target file extension / audio format (e.g. "mp3")
    pub format: String,
}

impl DownloadRequest {
    /// Create a new request
    pub fn new(item: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            format: format.into(),
        }
    }
}

/// Outcome of a single item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DownloadResult {
    /// Whether a file for this item is present in the output folder
    pub success: bool,
    /// The item exactly as it was requested
    pub query: String,
    /// Location of the produced (or already present) file
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub output_path: Option<PathBuf>,
    /// Why the item failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// True when the file already existed and no fetch was made
    #[serde(default)]
    pub skipped: bool,
    /// Title the item resolved to, when the probe got that far
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl DownloadResult {
    /// A freshly downloaded file
    pub fn downloaded(query: impl Into<String>, title: impl Into<String>, path: PathBuf) -> Self {
        Self {
            success: true,
            query: query.into(),
            output_path: Some(path),
            error_message: None,
            skipped: false,
            title: Some(title.into()),
        }
    }

    /// A file that was already present before the task ran
    pub fn already_present(
        query: impl Into<String>,
        title: impl Into<String>,
        path: PathBuf,
    ) -> Self {
        Self {
            skipped: true,
            ..Self::downloaded(query, title, path)
        }
    }

    /// A failed item
    pub fn failed(query: impl Into<String>, title: Option<String>, error: impl fmt::Display) -> Self {
        Self {
            success: false,
            query: query.into(),
            output_path: None,
            error_message: Some(error.to_string()),
            skipped: false,
            title,
        }
    }
}

/// Aggregated outcome of a batch
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BatchResult {
    /// Whether there is something to hand back to the caller
    pub success: bool,
    /// The single file (one item) or the archive (several items)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub output_path: Option<PathBuf>,
    /// Human-readable summary
    pub message: String,
    /// Per-item results, in request order
    pub items: Vec<DownloadResult>,
}

impl BatchResult {
    /// Number of items that ended with a file
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|r| r.success).count()
    }

    /// Number of items that failed
    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }
}

/// What a media fetcher learned about an item without downloading it
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProbeInfo {
    /// Resolved title, if the source exposes one
    pub title: Option<String>,
}

/// What a media fetcher reports after a download
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Title the fetcher resolved during the download
    pub resolved_title: Option<String>,
    /// Path the fetcher claims to have written
    pub output_path: Option<PathBuf>,
}

/// Stage of a single-item download task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskStage {
    /// Asking the fetcher for the resolved title
    Probing,
    /// Looking for an existing file
    Checking,
    /// Downloading and transcoding
    Fetching,
    /// Locating the file the fetch produced
    Reconciling,
    /// Finished (successfully or not)
    Done,
}

impl fmt::Display for TaskStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskStage::Probing => "probing",
            TaskStage::Checking => "checking",
            TaskStage::Fetching => "fetching",
            TaskStage::Reconciling => "reconciling",
            TaskStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// How many tracks to take from a playlist
///
/// Serialized as the string `"all"` or a non-negative integer. Numeric
/// strings (`"10"`) are accepted on input, since form clients send them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrackLimit {
    /// Every track the page exposes
    #[default]
    All,
    /// At most this many tracks
    Count(usize),
}

impl TrackLimit {
    /// Whether `collected` tracks satisfy the limit
    pub fn is_reached(&self, collected: usize) -> bool {
        match self {
            TrackLimit::All => false,
            TrackLimit::Count(n) => collected >= *n,
        }
    }

    /// Truncate a list to the limit
    pub fn apply<T>(&self, mut items: Vec<T>) -> Vec<T> {
        if let TrackLimit::Count(n) = self {
            items.truncate(*n);
        }
        items
    }
}

impl fmt::Display for TrackLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackLimit::All => f.write_str("all"),
            TrackLimit::Count(n) => write!(f, "{n}"),
        }
    }
}

impl Serialize for TrackLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TrackLimit::All => serializer.serialize_str("all"),
            TrackLimit::Count(n) => serializer.serialize_u64(*n as u64),
        }
    }
}

impl<'de> Deserialize<'de> for TrackLimit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TrackLimitVisitor;

        impl Visitor<'_> for TrackLimitVisitor {
            type Value = TrackLimit;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("\"all\" or a non-negative integer")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<TrackLimit, E> {
                usize::try_from(v)
                    .map(TrackLimit::Count)
                    .map_err(|_| E::custom("track count out of range"))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<TrackLimit, E> {
                u64::try_from(v)
                    .map_err(|_| E::custom("track count must not be negative"))
                    .and_then(|v| self.visit_u64(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<TrackLimit, E> {
                let v = v.trim();
                if v.eq_ignore_ascii_case("all") {
                    return Ok(TrackLimit::All);
                }
                v.parse::<usize>()
                    .map(TrackLimit::Count)
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_any(TrackLimitVisitor)
    }
}

/// Event emitted during batch processing
///
/// Subscribe through [`MusicDownloader::subscribe`](crate::MusicDownloader::subscribe)
/// or the `/events` SSE endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A batch passed validation and is being dispatched
    BatchStarted {
        /// Batch ID
        batch_id: BatchId,
        /// Number of items in the batch
        items: usize,
        /// Requested format
        format: String,
    },

    /// A worker picked up an item
    ItemStarted {
        /// Batch ID
        batch_id: BatchId,
        /// Position of the item in the request
        index: usize,
        /// The item as requested
        query: String,
    },

    /// The item's file already existed
    ItemSkipped {
        /// Batch ID
        batch_id: BatchId,
        /// Position of the item in the request
        index: usize,
        /// The item as requested
        query: String,
        /// Existing file
        #[schema(value_type = String)]
        path: PathBuf,
    },

    /// The item was downloaded
    ItemCompleted {
        /// Batch ID
        batch_id: BatchId,
        /// Position of the item in the request
        index: usize,
        /// The item as requested
        query: String,
        /// Produced file
        #[schema(value_type = String)]
        path: PathBuf,
    },

    /// The item failed
    ItemFailed {
        /// Batch ID
        batch_id: BatchId,
        /// Position of the item in the request
        index: usize,
        /// The item as requested
        query: String,
        /// Error message
        error: String,
    },

    /// The output folder was bundled into an archive
    ArchiveCreated {
        /// Batch ID
        batch_id: BatchId,
        /// Archive location
        #[schema(value_type = String)]
        path: PathBuf,
    },

    /// All items of the batch have finished
    BatchComplete {
        /// Batch ID
        batch_id: BatchId,
        /// Whether the batch produced something to return
        success: bool,
        /// Items with a file
        succeeded: usize,
        /// Items without a file
        failed: usize,
        /// File or archive handed back to the caller
        #[serde(skip_serializing_if = "Option::is_none")]
        #[schema(value_type = Option<String>)]
        output_path: Option<PathBuf>,
    },

    /// The worker pool stopped accepting batches
    Shutdown,
}

/// Overall system capabilities
///
/// Reports what the configured media fetcher can do, so clients can tell
/// a missing yt-dlp binary apart from a failing download.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Capabilities {
    /// Media fetcher capabilities
    pub fetcher: FetcherCapabilitiesInfo,

    /// Worker pool capacity
    pub max_concurrent_downloads: usize,

    /// Format used when a request names none
    pub default_format: String,
}

/// Information about the media fetcher in use
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FetcherCapabilitiesInfo {
    /// Whether items can be downloaded at all
    pub can_fetch: bool,

    /// Whether audio can be extracted/transcoded to the requested format
    pub can_transcode: bool,

    /// Name of the fetcher implementation in use
    pub handler: String,
}
