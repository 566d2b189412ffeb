//! Gateway tests: routing through the cache manager, offline behavior,
//! and an end-to-end run against a real HTTP origin.

mod common;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use breathbox::cache::manager::CacheManager;
use breathbox::cache::network::HttpOrigin;
use breathbox::cache::storage::MemoryCache;
use breathbox::gateway::build_router;

use common::{FakeOrigin, SHELL_PATHS, VERSION, active_manager};

async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ============================================================================
// Router over a fake origin
// ============================================================================

#[tokio::test]
async fn test_precached_path_served_offline() {
    let (manager, _, origin) = active_manager().await;
    origin.set_offline(true);
    let router = build_router(manager);

    let response = router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/html"
    );
    assert_eq!(body_string(response).await, "asset:/");
}

#[tokio::test]
async fn test_offline_unknown_path_falls_back_to_shell() {
    let (manager, _, origin) = active_manager().await;
    origin.set_offline(true);
    let router = build_router(manager);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/somewhere/else")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "asset:/");
}

#[tokio::test]
async fn test_offline_without_shell_is_503() {
    let origin = Arc::new(FakeOrigin::with_shell());
    let backend = Arc::new(MemoryCache::new());
    let manager = Arc::new(CacheManager::new(
        VERSION,
        vec!["/manifest.json".to_string()],
        "/",
        backend,
        Arc::clone(&origin) as Arc<dyn breathbox::cache::network::Origin>,
    ));
    manager.install().await.unwrap();
    manager.activate().await.unwrap();
    origin.set_offline(true);

    let router = build_router(manager);
    let response = router
        .oneshot(
            Request::builder()
                .uri("/anything")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_post_is_forwarded_not_cached() {
    let (manager, backend, _) = active_manager().await;
    let router = build_router(manager);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/submit")
                .body(Body::from("payload"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "forwarded:POST /submit");

    use breathbox::cache::storage::CacheBackend;
    assert_eq!(backend.get(VERSION, "/submit").await.unwrap(), None);
}

#[tokio::test]
async fn test_network_failure_maps_to_bad_gateway_for_pass_through() {
    let (manager, _, origin) = active_manager().await;
    origin.set_offline(true);
    let router = build_router(manager);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/submit")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

// ============================================================================
// End-to-end over a real HTTP origin
// ============================================================================

async fn shell_page() -> Html<&'static str> {
    Html("<html>shell</html>")
}

async fn manifest() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], "{}")
}

async fn icon() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/svg+xml")], "<svg/>")
}

/// Starts a throwaway origin server; returns its address and the token
/// that stops it.
async fn spawn_origin() -> (SocketAddr, CancellationToken) {
    let app = Router::new()
        .route("/", get(shell_page))
        .route("/manifest.json", get(manifest))
        .route("/icon-192x192.svg", get(icon))
        .route("/icon-512x512.svg", get(icon))
        .route("/app.css", get(|| async { "body{}" }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .unwrap();
    });

    (addr, cancel)
}

#[tokio::test]
async fn test_end_to_end_install_serve_then_offline() {
    let (addr, origin_cancel) = spawn_origin().await;

    let origin = Arc::new(HttpOrigin::new(
        reqwest::Url::parse(&format!("http://{addr}")).unwrap(),
        Duration::from_secs(2),
    ));
    let backend = Arc::new(MemoryCache::new());
    let manager = Arc::new(CacheManager::new(
        VERSION,
        SHELL_PATHS.iter().map(ToString::to_string).collect(),
        "/",
        backend,
        origin,
    ));

    tokio_test::assert_ok!(manager.install().await);
    tokio_test::assert_ok!(manager.activate().await);

    let router = build_router(Arc::clone(&manager));

    // Live: uncached path comes from the origin and lands in the cache.
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/app.css")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "body{}");

    // Take the origin down entirely.
    origin_cancel.cancel();
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Precached shell still serves.
    let response = router
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "<html>shell</html>");

    // Unknown paths fall back to the shell.
    let response = router
        .oneshot(
            Request::builder()
                .uri("/never-seen")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "<html>shell</html>");
}
