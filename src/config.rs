//! Configuration types for music-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf, time::Duration};
use utoipa::ToSchema;

/// Download behavior configuration (output folder, concurrency, format)
///
/// Used as a flattened sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Output folder shared by every worker (default: "musics")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Worker pool capacity: maximum items fetched at the same time (default: 3)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_downloads: usize,

    /// Format used when a request does not name one (default: "mp3")
    #[serde(default = "default_format")]
    pub default_format: String,

    /// Upper bound for a single item, probe through reconciliation (None = unbounded)
    ///
    /// A task that runs past this limit is reported as a fetch failure. The
    /// underlying fetcher process is killed when its future is dropped.
    #[serde(default, with = "optional_duration_serde")]
    pub task_timeout: Option<Duration>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            max_concurrent_downloads: default_max_concurrent(),
            default_format: default_format(),
            task_timeout: None,
        }
    }
}

/// External tool paths (yt-dlp, ffmpeg) and transcoding settings
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ToolsConfig {
    /// Path to yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Path to ffmpeg, passed to yt-dlp as `--ffmpeg-location` (yt-dlp's own lookup if None)
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Audio quality handed to the transcoder (default: "192K")
    #[serde(default = "default_audio_quality")]
    pub audio_quality: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            ffmpeg_path: None,
            search_path: true,
            audio_quality: default_audio_quality(),
        }
    }
}

/// Playlist track listing configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PlaylistConfig {
    /// Maximum number of page snapshots before giving up (default: 50)
    #[serde(default = "default_max_scrolls")]
    pub max_scrolls: usize,

    /// Pause between two snapshots, in seconds (default: 1)
    #[serde(default = "default_scroll_wait", with = "duration_serde")]
    pub scroll_wait: Duration,

    /// Timeout for loading one page, in seconds (default: 30)
    #[serde(default = "default_page_timeout", with = "duration_serde")]
    pub page_timeout: Duration,

    /// User-Agent sent with page requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            max_scrolls: default_max_scrolls(),
            scroll_wait: default_scroll_wait(),
            page_timeout: default_page_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Main configuration for [`MusicDownloader`](crate::MusicDownloader)
///
/// Fields are organized into logical sub-configs:
/// - [`download`](DownloadConfig) - output folder, concurrency, default format
/// - [`tools`](ToolsConfig) - yt-dlp / ffmpeg lookup
/// - [`playlist`](PlaylistConfig) - playlist page walking
/// - [`server`](ServerIntegrationConfig) - REST API
///
/// `download`, `tools` and `server` are flattened, so their keys sit at the
/// top level of the JSON file; `playlist` is a nested object.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Download behavior settings
    #[serde(flatten)]
    pub download: DownloadConfig,

    /// External tool paths
    #[serde(flatten)]
    pub tools: ToolsConfig,

    /// Playlist track listing
    #[serde(default)]
    pub playlist: PlaylistConfig,

    /// API server settings
    #[serde(flatten)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Output folder
    pub fn output_dir(&self) -> &PathBuf {
        &self.download.output_dir
    }

    /// Load configuration from a JSON file
    ///
    /// Missing keys fall back to their defaults, so `{}` is a valid file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `MUSIC_DL_*` environment variable overrides
    ///
    /// Recognized variables: `MUSIC_DL_OUTPUT_DIR`, `MUSIC_DL_MAX_CONCURRENT`,
    /// `MUSIC_DL_FORMAT`, `MUSIC_DL_TASK_TIMEOUT_SECS`, `MUSIC_DL_YTDLP_PATH`,
    /// `MUSIC_DL_FFMPEG_PATH`, `MUSIC_DL_BIND`, `MUSIC_DL_API_KEY`.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Some(dir) = env_var("MUSIC_DL_OUTPUT_DIR") {
            self.download.output_dir = PathBuf::from(dir);
        }
        if let Some(value) = env_var("MUSIC_DL_MAX_CONCURRENT") {
            self.download.max_concurrent_downloads =
                parse_env("MUSIC_DL_MAX_CONCURRENT", &value)?;
        }
        if let Some(format) = env_var("MUSIC_DL_FORMAT") {
            self.download.default_format = format;
        }
        if let Some(value) = env_var("MUSIC_DL_TASK_TIMEOUT_SECS") {
            let secs: u64 = parse_env("MUSIC_DL_TASK_TIMEOUT_SECS", &value)?;
            self.download.task_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(path) = env_var("MUSIC_DL_YTDLP_PATH") {
            self.tools.ytdlp_path = Some(PathBuf::from(path));
        }
        if let Some(path) = env_var("MUSIC_DL_FFMPEG_PATH") {
            self.tools.ffmpeg_path = Some(PathBuf::from(path));
        }
        if let Some(value) = env_var("MUSIC_DL_BIND") {
            self.server.api.bind_address = parse_env("MUSIC_DL_BIND", &value)?;
        }
        if let Some(key) = env_var("MUSIC_DL_API_KEY") {
            self.server.api.api_key = Some(key);
        }
        self.validate()
    }

    /// Check settings that would make the downloader unusable
    pub fn validate(&self) -> Result<()> {
        if self.download.max_concurrent_downloads == 0 {
            return Err(Error::Config {
                message: "max_concurrent_downloads must be at least 1".into(),
                key: Some("max_concurrent_downloads".into()),
            });
        }
        crate::utils::normalize_format(&self.download.default_format).map_err(|_| {
            Error::Config {
                message: format!(
                    "default_format {:?} is not a valid file extension",
                    self.download.default_format
                ),
                key: Some("default_format".into()),
            }
        })?;
        if self.download.task_timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::Config {
                message: "task_timeout must be greater than zero".into(),
                key: Some("task_timeout".into()),
            });
        }
        if self.playlist.max_scrolls == 0 {
            return Err(Error::Config {
                message: "max_scrolls must be at least 1".into(),
                key: Some("playlist.max_scrolls".into()),
            });
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(name: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| Error::Config {
        message: format!("{name}={value:?}: {e}"),
        key: Some(name.to_string()),
    })
}

/// API and external server integration configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:8000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Optional API key for authentication
    #[serde(default)]
    pub api_key: Option<String>,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            api_key: None,
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

// Default value functions
fn default_output_dir() -> PathBuf {
    PathBuf::from("musics")
}

fn default_max_concurrent() -> usize {
    3
}

fn default_format() -> String {
    "mp3".to_string()
}

fn default_true() -> bool {
    true
}

fn default_audio_quality() -> String {
    "192K".to_string()
}

fn default_max_scrolls() -> usize {
    50
}

fn default_scroll_wait() -> Duration {
    Duration::from_secs(1)
}

fn default_page_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("music-dl/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
