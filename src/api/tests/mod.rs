use super::*;
use crate::downloader::test_helpers::{StubBehavior, StubFetcher, StubTrackLister};
use crate::error::ApiError;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;


/// Downloader around a stub fetcher, plus the tempdir that must outlive it
async fn create_test_downloader(fetcher: StubFetcher) -> (Arc<MusicDownloader>, TempDir) {
    let (downloader, _fetcher, temp_dir) =
        crate::downloader::test_helpers::create_test_downloader(fetcher).await;
    (Arc::new(downloader), temp_dir)
}

/// Router over a stub-backed downloader with the default API settings
async fn test_router(fetcher: StubFetcher) -> (Router, Arc<MusicDownloader>, TempDir) {
    let (downloader, temp_dir) = create_test_downloader(fetcher).await;
    let config = downloader.get_config();
    (create_router(downloader.clone(), config), downloader, temp_dir)
}

fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn api_error(response: Response) -> ApiError {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn header<'a>(response: &'a Response, name: &str) -> &'a str {
    response.headers().get(name).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn server_binds_and_answers_health() {
    let (downloader, _temp_dir) = create_test_downloader(StubFetcher::new()).await;

    // grab a free port, then release it for the server
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let mut config = (*downloader.get_config()).clone();
    config.server.api.bind_address = format!("127.0.0.1:{port}").parse().unwrap();
    let config = Arc::new(config);

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(serve_with_shutdown(downloader, config, async move {
        stop_rx.await.ok();
    }));
    tokio::time::sleep(Duration::from_millis(100)).await;

    let response = reqwest::get(format!("http://127.0.0.1:{port}/health"))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    stop_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn spawn_api_server_runs_in_background() {
    let (downloader, _temp_dir) = create_test_downloader(StubFetcher::new()).await;

    let handle = downloader.spawn_api_server();
    tokio::time::sleep(Duration::from_millis(50)).await;

    // either still serving, or failed because the default port is taken
    if handle.is_finished() {
        assert!(matches!(
            handle.await.unwrap(),
            Err(crate::error::Error::Io(_))
        ));
    } else {
        handle.abort();
    }
}

#[tokio::test]
async fn cors_allows_any_origin_by_default() {
    let (app, _downloader, _temp_dir) = test_router(StubFetcher::new()).await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "access-control-allow-origin"), "*");
}

#[tokio::test]
async fn cors_restricts_to_listed_origins() {
    let (downloader, _temp_dir) = create_test_downloader(StubFetcher::new()).await;
    let mut config = (*downloader.get_config()).clone();
    config.server.api.cors_origins = vec!["http://allowed.example".to_string()];
    let app = create_router(downloader, Arc::new(config));

    let allowed = Request::builder()
        .uri("/health")
        .header("Origin", "http://allowed.example")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(allowed).await.unwrap();
    assert_eq!(
        header(&response, "access-control-allow-origin"),
        "http://allowed.example"
    );

    let other = Request::builder()
        .uri("/health")
        .header("Origin", "http://other.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(other).await.unwrap();
    assert!(response.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn cors_can_be_disabled() {
    let (downloader, _temp_dir) = create_test_downloader(StubFetcher::new()).await;
    let mut config = (*downloader.get_config()).clone();
    config.server.api.cors_enabled = false;
    let app = create_router(downloader, Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(response.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn api_key_guards_every_route() {
    let (downloader, _temp_dir) = create_test_downloader(StubFetcher::new()).await;
    let mut config = (*downloader.get_config()).clone();
    config.server.api.api_key = Some("letmein".to_string());
    let app = create_router(downloader, Arc::new(config));

    let anonymous = app
        .clone()
        .oneshot(json_request("/music/download", serde_json::json!({"items": ["Song"]})))
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(api_error(anonymous).await.error.code, "unauthorized");

    let request = Request::builder()
        .uri("/health")
        .header("X-Api-Key", "letmein")
        .body(Body::empty())
        .unwrap();
    let authorized = app.oneshot(request).await.unwrap();
    assert_eq!(authorized.status(), StatusCode::OK);
}

#[tokio::test]
async fn swagger_ui_follows_config() {
    let (app, downloader, _temp_dir) = test_router(StubFetcher::new()).await;
    let request = Request::builder()
        .uri("/swagger-ui/")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut config = (*downloader.get_config()).clone();
    config.server.api.swagger_ui = false;
    let app = create_router(downloader, Arc::new(config));
    let request = Request::builder()
        .uri("/swagger-ui/")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
