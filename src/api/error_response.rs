//! HTTP error responses
//!
//! Domain errors and failed batches become JSON [`ApiError`] bodies with a
//! matching status code.

use crate::error::{ApiError, Error, ToHttpStatus};
use crate::types::BatchResult;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status_code.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let api_error: ApiError = self.into();
        (status_code, Json(api_error)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Errors with a known status go through Error::into_response
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}

/// Response for a batch that produced nothing to hand back
///
/// 422 with the batch message; every per-item result is listed under
/// `details.items`.
pub fn failed_batch_response(batch: BatchResult) -> Response {
    let code = if batch.items.len() == 1 {
        "download_failed"
    } else {
        "no_results"
    };
    let details = serde_json::json!({ "items": batch.items });

    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiError::with_details(code, batch.message, details)),
    )
        .into_response()
}
