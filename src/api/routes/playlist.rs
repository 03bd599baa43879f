//! Playlist handlers.

use super::{PlaylistDownloadRequest, PlaylistRequest, PlaylistTracksResponse, batch_response};
use crate::api::AppState;
use crate::error::ApiError;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// POST /spotify/playlist - List the track names of a playlist
#[utoipa::path(
    post,
    path = "/spotify/playlist",
    tag = "playlist",
    request_body = PlaylistRequest,
    responses(
        (status = 200, description = "Track names in page order", body = PlaylistTracksResponse),
        (status = 502, description = "The playlist page could not be loaded", body = ApiError)
    )
)]
pub async fn list_playlist(
    State(state): State<AppState>,
    Json(request): Json<PlaylistRequest>,
) -> Response {
    match state
        .downloader
        .list_playlist(&request.playlist_url, request.count)
        .await
    {
        Ok(tracks) => {
            let count = tracks.len();
            (
                StatusCode::OK,
                Json(PlaylistTracksResponse {
                    playlist_url: request.playlist_url,
                    tracks,
                    count,
                }),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST /spotify/download - Download the tracks of a playlist
#[utoipa::path(
    post,
    path = "/spotify/download",
    tag = "playlist",
    request_body = PlaylistDownloadRequest,
    responses(
        (status = 200, description = "The audio file for one track, a zip archive for several", content_type = "application/octet-stream"),
        (status = 404, description = "The playlist yielded no tracks", body = ApiError),
        (status = 422, description = "No file was produced", body = ApiError),
        (status = 502, description = "The playlist page could not be loaded", body = ApiError)
    )
)]
pub async fn download_playlist(
    State(state): State<AppState>,
    Json(request): Json<PlaylistDownloadRequest>,
) -> Response {
    tracing::info!(url = %request.playlist_url, count = %request.count, "POST /spotify/download");

    match state
        .downloader
        .download_playlist(
            &request.playlist_url,
            request.count,
            request.format.as_deref(),
        )
        .await
    {
        Ok(batch) => batch_response(batch).await.into_response(),
        Err(e) => e.into_response(),
    }
}
