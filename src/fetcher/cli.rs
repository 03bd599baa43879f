//! CLI-based media fetcher using the external yt-dlp binary

use super::EXT_PLACEHOLDER;
use super::traits::{FetcherCapabilities, MediaFetcher};
use crate::config::ToolsConfig;
use crate::types::{FetchOutcome, ProbeInfo};
use crate::utils::is_url;
use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;

/// Formats yt-dlp can extract audio into (`-x --audio-format`)
pub const AUDIO_FORMATS: &[&str] = &["mp3", "wav", "m4a", "aac", "flac", "opus", "vorbis", "alac"];

/// Media fetcher that shells out to `yt-dlp`
///
/// Free-text items are searched with `ytsearch1:`; URLs are passed through.
/// Audio formats are extracted with ffmpeg (through yt-dlp's `-x`), and the
/// real output path is read back from `--print after_move:filepath`.
///
/// # Examples
///
/// ```no_run
/// use music_dl::fetcher::{CliMediaFetcher, MediaFetcher};
/// use std::path::PathBuf;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // Create with explicit path
/// let fetcher = CliMediaFetcher::new(PathBuf::from("/usr/local/bin/yt-dlp"))
///     .with_audio_quality("320K");
///
/// // Or auto-discover from PATH
/// let fetcher = CliMediaFetcher::from_path().expect("yt-dlp not found in PATH");
///
/// let info = fetcher.probe("https://youtu.be/dQw4w9WgXcQ").await?;
/// # Ok(())
/// # }
/// ```
pub struct CliMediaFetcher {
    binary_path: PathBuf,
    ffmpeg_path: Option<PathBuf>,
    audio_quality: String,
    transcode_available: bool,
}

#[derive(Deserialize)]
struct YtDlpMetadata {
    title: Option<String>,
}

impl CliMediaFetcher {
    /// Create a new CLI fetcher with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            ffmpeg_path: None,
            audio_quality: "192K".to_string(),
            transcode_available: which::which("ffmpeg").is_ok(),
        }
    }

    /// Attempt to find yt-dlp in PATH
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Build a fetcher from the tools configuration
    ///
    /// Returns `None` when no binary is configured and PATH search is
    /// disabled or finds nothing.
    pub fn from_config(tools: &ToolsConfig) -> Option<Self> {
        let fetcher = match &tools.ytdlp_path {
            Some(path) => Self::new(path.clone()),
            None if tools.search_path => Self::from_path()?,
            None => return None,
        };
        let fetcher = fetcher.with_audio_quality(tools.audio_quality.clone());
        Some(match &tools.ffmpeg_path {
            Some(ffmpeg) => fetcher.with_ffmpeg(ffmpeg.clone()),
            None => fetcher,
        })
    }

    /// Pass an explicit ffmpeg location to yt-dlp
    pub fn with_ffmpeg(mut self, ffmpeg_path: PathBuf) -> Self {
        self.ffmpeg_path = Some(ffmpeg_path);
        self.transcode_available = true;
        self
    }

    /// Audio quality for extracted audio (e.g. "192K", or "0" for best VBR)
    pub fn with_audio_quality(mut self, quality: impl Into<String>) -> Self {
        self.audio_quality = quality.into();
        self
    }

    /// Path of the yt-dlp binary in use
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    fn probe_args(&self, query: &str) -> Vec<OsString> {
        vec![
            "--dump-json".into(),
            "--no-download".into(),
            "--no-playlist".into(),
            "--no-warnings".into(),
            source_for(query).into(),
        ]
    }

    fn fetch_args(&self, query: &str, target_template: &Path, format: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["--no-playlist".into(), "--no-warnings".into()];

        if AUDIO_FORMATS.contains(&format) {
            args.extend([
                "-f".into(),
                "bestaudio/best".into(),
                "-x".into(),
                "--audio-format".into(),
                format.into(),
                "--audio-quality".into(),
                self.audio_quality.clone().into(),
            ]);
        } else {
            // not an extractable audio codec: prefer a source already in that container
            args.extend([
                "-f".into(),
                format!("bestaudio[ext={format}]/bestaudio/best").into(),
            ]);
        }

        if let Some(ffmpeg) = &self.ffmpeg_path {
            args.push("--ffmpeg-location".into());
            args.push(ffmpeg.clone().into_os_string());
        }

        args.extend([
            "-o".into(),
            target_template.as_os_str().to_owned(),
            "--print".into(),
            "after_move:filepath".into(),
            source_for(query).into(),
        ]);
        args
    }

    async fn run(&self, args: Vec<OsString>) -> crate::Result<Output> {
        Command::new(&self.binary_path)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| crate::Error::ExternalTool(format!("Failed to execute yt-dlp: {}", e)))
    }
}

#[async_trait]
impl MediaFetcher for CliMediaFetcher {
    async fn probe(&self, query: &str) -> crate::Result<ProbeInfo> {
        let output = self.run(self.probe_args(query)).await?;
        if !output.status.success() {
            return Err(crate::Error::Resolution(failure_summary(&output)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .ok_or_else(|| crate::Error::Resolution(format!("no match for {:?}", query)))?;

        let meta: YtDlpMetadata = serde_json::from_str(line)?;
        Ok(ProbeInfo {
            title: meta.title.filter(|t| !t.trim().is_empty()),
        })
    }

    async fn fetch(
        &self,
        query: &str,
        target_template: &Path,
        format: &str,
    ) -> crate::Result<FetchOutcome> {
        let output = self
            .run(self.fetch_args(query, target_template, format))
            .await?;
        if !output.status.success() {
            return Err(crate::Error::Fetch(failure_summary(&output)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let output_path = stdout
            .lines()
            .map(str::trim)
            .rfind(|l| !l.is_empty() && !l.contains(EXT_PLACEHOLDER))
            .map(PathBuf::from);
        let resolved_title = output_path
            .as_deref()
            .and_then(Path::file_stem)
            .and_then(|s| s.to_str())
            .map(str::to_string);

        Ok(FetchOutcome {
            resolved_title,
            output_path,
        })
    }

    fn capabilities(&self) -> FetcherCapabilities {
        FetcherCapabilities {
            can_fetch: true,
            can_transcode: self.transcode_available,
        }
    }

    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }
}

/// What yt-dlp should download: the URL itself, or the first search hit
fn source_for(query: &str) -> String {
    let query = query.trim();
    if is_url(query) {
        query.to_string()
    } else {
        format!("ytsearch1:{}", query)
    }
}

/// Most useful line of a failed run: the last `ERROR:` line, else the last stderr line
fn failure_summary(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let mut lines = stderr.lines().map(str::trim).filter(|l| !l.is_empty());
    let last_error = lines.clone().rfind(|l| l.starts_with("ERROR"));
    match last_error.or_else(|| lines.next_back()) {
        Some(line) => line.to_string(),
        None => format!("yt-dlp exited with {}", output.status),
    }
}
