//! Batch download handlers.

use super::{FormatQuery, MusicDownloadRequest, batch_response};
use crate::api::AppState;
use crate::error::ApiError;
use axum::{
    Json,
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// POST /music/download - Download a list of items
#[utoipa::path(
    post,
    path = "/music/download",
    tag = "music",
    request_body = MusicDownloadRequest,
    responses(
        (status = 200, description = "The audio file for one item, a zip archive for several", content_type = "application/octet-stream"),
        (status = 400, description = "Empty batch, blank item or invalid format", body = ApiError),
        (status = 422, description = "No file was produced", body = ApiError),
        (status = 503, description = "Server is shutting down", body = ApiError)
    )
)]
pub async fn download_music(
    State(state): State<AppState>,
    Json(request): Json<MusicDownloadRequest>,
) -> Response {
    tracing::info!(items = request.items.len(), format = ?request.format, "POST /music/download");

    match state
        .downloader
        .download(request.items, request.format.as_deref())
        .await
    {
        Ok(batch) => batch_response(batch).await.into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /music/download/txt - Download every line of an uploaded text file
#[utoipa::path(
    post,
    path = "/music/download/txt",
    tag = "music",
    params(FormatQuery),
    request_body(content = String, description = "Multipart form with a `file` field, one item per line", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "The audio file for one item, a zip archive for several", content_type = "application/octet-stream"),
        (status = 400, description = "Missing or unreadable file, empty batch or invalid format", body = ApiError),
        (status = 422, description = "No file was produced", body = ApiError),
        (status = 503, description = "Server is shutting down", body = ApiError)
    )
)]
pub async fn download_music_txt(
    State(state): State<AppState>,
    Query(query): Query<FormatQuery>,
    mut multipart: Multipart,
) -> Response {
    let mut content: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return bad_request(format!("Invalid multipart body: {}", e)),
        };
        if field.name() != Some("file") {
            continue;
        }
        match field.bytes().await {
            Ok(bytes) => match String::from_utf8(bytes.to_vec()) {
                Ok(text) => content = Some(text),
                Err(_) => return bad_request("Uploaded file is not valid UTF-8 text"),
            },
            Err(e) => return bad_request(format!("Failed to read file: {}", e)),
        }
    }

    let Some(content) = content else {
        return bad_request("No text file provided in 'file' field");
    };
    let items = lines_to_items(&content);
    tracing::info!(items = items.len(), format = ?query.format, "POST /music/download/txt");

    match state
        .downloader
        .download(items, query.format.as_deref())
        .await
    {
        Ok(batch) => batch_response(batch).await.into_response(),
        Err(e) => e.into_response(),
    }
}

/// One item per non-blank line, trimmed
pub(crate) fn lines_to_items(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn bad_request(message: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(ApiError::validation(message))).into_response()
}
