//! REST API server module
//!
//! Exposes batch downloads, playlist downloads and a few system endpoints
//! over HTTP, with an OpenAPI description generated by utoipa.

use crate::{Config, MusicDownloader, Result};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Largest accepted request body (item list or uploaded text file)
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Music
/// - `POST /music/download` - Download a JSON list of items
/// - `POST /music/download/txt` - Download the lines of an uploaded text file
///
/// ## Playlist
/// - `POST /spotify/playlist` - List the tracks of a playlist
/// - `POST /spotify/download` - Download the tracks of a playlist
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /capabilities` - Query system capabilities
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive documentation (if enabled)
/// - `GET /events` - Server-sent events stream
pub fn create_router(downloader: Arc<MusicDownloader>, config: Arc<Config>) -> Router {
    let api = &config.server.api;
    let state = AppState::new(downloader, config.clone());

    let router = Router::new()
        // Music
        .route("/music/download", post(routes::download_music))
        .route("/music/download/txt", post(routes::download_music_txt))
        // Playlist
        .route("/spotify/playlist", post(routes::list_playlist))
        .route("/spotify/download", post(routes::download_playlist))
        // System
        .route("/health", get(routes::health_check))
        .route("/capabilities", get(routes::get_capabilities))
        .route("/openapi.json", get(routes::openapi_spec))
        .route("/events", get(routes::event_stream));

    let router = if api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    // Auth runs inside CORS so preflight requests are answered without a key
    let router = if api.api_key.is_some() {
        router.layer(middleware::from_fn_with_state(
            api.api_key.clone(),
            auth::require_api_key,
        ))
    } else {
        router
    };

    let router = if api.cors_enabled {
        router.layer(build_cors_layer(&api.cors_origins))
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http())
}

/// Build a CORS layer from the configured origins
///
/// `"*"` (or an empty list) allows any origin; otherwise only the listed
/// origins are allowed. Methods and headers are unrestricted.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(allowed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the API server on the configured bind address
///
/// Runs until the server fails. See [`serve_with_shutdown`] for a server
/// that stops on a signal.
///
/// # Example
///
/// ```no_run
/// use music_dl::{MusicDownloader, Config};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let downloader = Arc::new(MusicDownloader::new((*config).clone()).await?);
///
/// music_dl::api::start_api_server(downloader, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(downloader: Arc<MusicDownloader>, config: Arc<Config>) -> Result<()> {
    serve_with_shutdown(downloader, config, std::future::pending()).await
}

/// Serve the API until `shutdown` resolves
///
/// In-flight requests are allowed to finish; the downloader itself is not
/// shut down here.
pub async fn serve_with_shutdown<F>(
    downloader: Arc<MusicDownloader>,
    config: Arc<Config>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = config.server.api.bind_address;
    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(downloader, config);
    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(address = %bind_address, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
