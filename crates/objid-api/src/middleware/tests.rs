//! Middleware tests.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use tower::ServiceExt;

use super::*;

/// Router with every middleware layer, serving a handler that echoes the request id.
fn test_app(metrics: Arc<RequestMetrics>) -> Router {
    let router = Router::new()
        .route(
            "/v2/check",
            post(|req: Request<Body>| async move {
                request_id_of(req.headers())
                    .unwrap_or("missing")
                    .to_string()
            }),
        )
        .route(
            "/error",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route("/denied", get(|| async { StatusCode::UNAUTHORIZED }));
    with_middleware(router, metrics)
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_request_id_is_generated() {
    // Arrange
    let app = test_app(Arc::new(RequestMetrics::new()));

    // Act
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v2/check")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let header = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .expect("Response should have x-request-id header")
        .to_str()
        .unwrap()
        .to_string();
    assert!(uuid::Uuid::parse_str(&header).is_ok());
    // The handler saw the same id
    assert_eq!(body_text(response).await, header);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let app = test_app(Arc::new(RequestMetrics::new()));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v2/check")
                .header(REQUEST_ID_HEADER, "client-id-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()[REQUEST_ID_HEADER], "client-id-42");
    assert_eq!(body_text(response).await, "client-id-42");
}

#[tokio::test]
async fn test_oversized_request_id_is_replaced() {
    let app = test_app(Arc::new(RequestMetrics::new()));
    let oversized = "x".repeat(MAX_REQUEST_ID_LENGTH + 1);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v2/check")
                .header(REQUEST_ID_HEADER, oversized.as_str())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let header = response.headers()[REQUEST_ID_HEADER].to_str().unwrap();
    assert_ne!(header, oversized);
    assert!(uuid::Uuid::parse_str(header).is_ok());
}

#[tokio::test]
async fn test_metrics_count_by_status_class() {
    // Arrange
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::INFO)
        .try_init();
    let metrics = Arc::new(RequestMetrics::new());

    // Act
    for uri in ["/error", "/denied", "/denied"] {
        test_app(Arc::clone(&metrics))
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
    }

    // Assert
    assert_eq!(metrics.request_count(), 3);
    assert_eq!(metrics.client_error_count(), 2);
    assert_eq!(metrics.server_error_count(), 1);
}

#[test]
fn test_request_metrics_record_without_recorder() {
    let metrics = RequestMetrics::new();

    metrics.record("POST", "/v2/check", 200, 0.01);
    metrics.record("POST", "/v2/getConsumption", 404, 0.02);

    assert_eq!(metrics.request_count(), 2);
    assert_eq!(metrics.client_error_count(), 1);
    assert_eq!(metrics.server_error_count(), 0);
}

#[tokio::test]
async fn test_cors_preflight_is_answered() {
    let app = test_app(Arc::new(RequestMetrics::new()));

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/v2/check")
                .header("Origin", "vscode-webview://extension")
                .header("Access-Control-Request-Method", "POST")
                .header("Access-Control-Request-Headers", "ninja-auth-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}
