//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`music`] - Batch downloads from a JSON list or an uploaded text file
//! - [`playlist`] - Playlist listing and playlist downloads
//! - [`system`] - Health, capabilities, events, OpenAPI

use crate::error::Result;
use crate::types::{BatchResult, TrackLimit};
use crate::utils::media_type_for_path;
use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;

mod music;
mod playlist;
mod system;

pub use music::*;
pub use playlist::*;
pub use system::*;

// ============================================================================
// Request/Response Types (shared across handlers)
// ============================================================================

/// Request body for POST /music/download
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct MusicDownloadRequest {
    /// Search queries or direct URLs, one per item
    pub items: Vec<String>,
    /// Output format (default: the configured `default_format`)
    #[serde(default)]
    pub format: Option<String>,
}

/// Query parameters for POST /music/download/txt
#[derive(Debug, Deserialize, Serialize, utoipa::IntoParams)]
pub struct FormatQuery {
    /// Output format (default: the configured `default_format`)
    pub format: Option<String>,
}

/// Request body for POST /spotify/playlist
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct PlaylistRequest {
    /// Public playlist page
    pub playlist_url: String,
    /// `"all"` or the number of tracks to take (default: all)
    #[serde(default)]
    #[schema(value_type = String, example = "all")]
    pub count: TrackLimit,
}

/// Request body for POST /spotify/download
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct PlaylistDownloadRequest {
    /// Public playlist page
    pub playlist_url: String,
    /// `"all"` or the number of tracks to take (default: all)
    #[serde(default)]
    #[schema(value_type = String, example = "all")]
    pub count: TrackLimit,
    /// Output format (default: the configured `default_format`)
    #[serde(default)]
    pub format: Option<String>,
}

/// Response for POST /spotify/playlist
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct PlaylistTracksResponse {
    /// The playlist that was listed
    pub playlist_url: String,
    /// Track names in page order
    pub tracks: Vec<String>,
    /// Number of tracks returned
    pub count: usize,
}

/// Turn a finished batch into an HTTP response
///
/// A successful batch streams its file (the audio file or the archive) as an
/// attachment. A failed one becomes a 422 listing every item.
pub(crate) async fn batch_response(batch: BatchResult) -> Result<Response> {
    let path = match (&batch.output_path, batch.success) {
        (Some(path), true) => path.clone(),
        _ => return Ok(crate::api::error_response::failed_batch_response(batch)),
    };

    let file = tokio::fs::File::open(&path).await?;
    let length = file.metadata().await?.len();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "download".to_string());

    tracing::debug!(path = %path.display(), bytes = length, "Streaming batch output");

    let mut response = Body::from_stream(ReaderStream::new(file)).into_response();
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(media_type_for_path(&path)),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    if let Ok(value) = HeaderValue::from_str(&content_disposition(&file_name)) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response)
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if fallback == file_name {
        return format!("attachment; filename=\"{}\"", file_name);
    }

    let encoded: String = url::form_urlencoded::byte_serialize(file_name.as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}
