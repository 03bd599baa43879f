//! OpenAPI documentation, generated at compile time with utoipa.

use utoipa::OpenApi;

/// OpenAPI documentation for the music-dl REST API
///
/// Served as JSON at `/openapi.json` and browsable at `/swagger-ui` when
/// `api.swagger_ui` is enabled.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "music-dl REST API",
        description = "Batch music downloads: resolve songs or URLs, fetch audio and get back one file or a zip archive",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        // Music
        crate::api::routes::download_music,
        crate::api::routes::download_music_txt,

        // Playlist
        crate::api::routes::list_playlist,
        crate::api::routes::download_playlist,

        // System
        crate::api::routes::health_check,
        crate::api::routes::get_capabilities,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        crate::types::BatchId,
        crate::types::DownloadRequest,
        crate::types::DownloadResult,
        crate::types::BatchResult,
        crate::types::TaskStage,
        crate::types::Event,
        crate::types::Capabilities,
        crate::types::FetcherCapabilitiesInfo,

        crate::config::ApiConfig,

        crate::api::routes::MusicDownloadRequest,
        crate::api::routes::PlaylistRequest,
        crate::api::routes::PlaylistDownloadRequest,
        crate::api::routes::PlaylistTracksResponse,

        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "music", description = "Batch downloads from a list of songs or URLs"),
        (name = "playlist", description = "Playlist listing and playlist downloads"),
        (name = "system", description = "Health, capabilities, OpenAPI spec and events"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Registers the `X-Api-Key` header scheme
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};

        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Api-Key"))),
            );
        }
    }
}
