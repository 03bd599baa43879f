//! Error types for music-dl
//!
//! This module provides the error handling for the library, including:
//! - The per-item failure taxonomy (resolution, fetch, missing output file)
//! - Batch-level failures (empty batch, no results)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for music-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for music-dl
///
/// Per-item variants (`Resolution`, `Fetch`, `FileNotProduced`) are normally
/// captured into a [`DownloadResult`](crate::types::DownloadResult) instead of
/// being propagated; the remaining variants surface to callers.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "output_dir")
        key: Option<String>,
    },

    /// The query or URL could not be resolved to a media source
    #[error("resolution error: {0}")]
    Resolution(String),

    /// Download or transcode failed
    #[error("fetch error: {0}")]
    Fetch(String),

    /// The fetcher finished but no output file could be located
    #[error("file not produced: expected {}", .path.display())]
    FileNotProduced {
        /// The path the download was expected to produce
        path: PathBuf,
    },

    /// A batch was submitted without any items
    #[error("empty batch: at least one item is required")]
    EmptyBatch,

    /// A batch contained a blank item
    #[error("empty item at position {index}")]
    EmptyItem {
        /// Zero-based position of the blank item in the request
        index: usize,
    },

    /// The batch finished without a single file in the output folder
    #[error("no files downloaded")]
    NoResults,

    /// The requested output format is not usable as a file extension
    #[error("invalid format: {0:?}")]
    InvalidFormat(String),

    /// Playlist page could not be loaded or parsed
    #[error("playlist error: {0}")]
    Playlist(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Archive writer error
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Worker pool is shut down - not accepting new batches
    #[error("shutdown in progress: not accepting new downloads")]
    ShuttingDown,

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// External tool execution failed (yt-dlp, ffmpeg)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Operation not supported (missing binary, not implemented, etc.)
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "empty_batch",
///     "message": "empty batch: at least one item is required"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "no_results", "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an API error with additional details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "unauthorized" error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - invalid input
            Error::Config { .. } => 400,
            Error::EmptyBatch => 400,
            Error::EmptyItem { .. } => 400,
            Error::InvalidFormat(_) => 400,

            // 404 Not Found - the query resolved to nothing
            Error::Resolution(_) => 404,

            // 422 Unprocessable Entity - request was valid but produced nothing usable
            Error::NoResults => 422,
            Error::FileNotProduced { .. } => 422,

            // 500 Internal Server Error - Server-side issues
            Error::Io(_) => 500,
            Error::Archive(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Serialization(_) => 500,
            Error::Other(_) => 500,

            // 502 Bad Gateway - External service errors
            Error::Fetch(_) => 502,
            Error::Network(_) => 502,
            Error::Playlist(_) => 502,

            // 503 Service Unavailable
            Error::ShuttingDown => 503,
            Error::ExternalTool(_) => 503,

            // 501 Not Implemented - Feature not supported
            Error::NotSupported(_) => 501,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Resolution(_) => "resolution_error",
            Error::Fetch(_) => "fetch_error",
            Error::FileNotProduced { .. } => "file_not_produced",
            Error::EmptyBatch => "empty_batch",
            Error::EmptyItem { .. } => "empty_item",
            Error::NoResults => "no_results",
            Error::InvalidFormat(_) => "invalid_format",
            Error::Playlist(_) => "playlist_error",
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::Archive(_) => "archive_error",
            Error::ShuttingDown => "shutting_down",
            Error::ApiServerError(_) => "api_server_error",
            Error::ExternalTool(_) => "external_tool_error",
            Error::NotSupported(_) => "not_supported",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::FileNotProduced { path } => Some(serde_json::json!({
                "path": path,
            })),
            Error::EmptyItem { index } => Some(serde_json::json!({
                "index": index,
            })),
            Error::InvalidFormat(format) => Some(serde_json::json!({
                "format": format,
            })),
            Error::Config {
                key: Some(key), ..
            } => Some(serde_json::json!({
                "key": key,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
