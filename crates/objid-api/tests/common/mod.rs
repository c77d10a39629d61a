//! Shared test utilities for objid API tests.

// Each test file uses a different subset of these helpers
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use objid_api::http::{create_router, AppState, AUTH_KEY_HEADER};
use objid_storage::{BlobPath, MemoryBlobStore};

/// Key protecting the `locked` fixture app.
pub const LOCKED_KEY: &str = "secret-key";

/// Seeds an app record blob.
pub fn seed_app(storage: &MemoryBlobStore, app_id: &str, record: Value) {
    storage.put(&BlobPath::app(app_id).unwrap(), record);
}

/// Seeds an app log blob.
pub fn seed_logs(storage: &MemoryBlobStore, app_id: &str, entries: Value) {
    storage.put(&BlobPath::app_log(app_id).unwrap(), entries);
}

/// Storage with an open app `open` and a protected app `locked`.
pub fn seeded_storage() -> Arc<MemoryBlobStore> {
    let storage = MemoryBlobStore::new_shared();
    seed_app(
        &storage,
        "open",
        json!({
            "codeunit": [50000, 50001],
            "table": [50000],
            "table_50000": [1, 2, 3],
            "_ranges": [{"from": 50000, "to": 59999}]
        }),
    );
    seed_app(
        &storage,
        "locked",
        json!({
            "page": [50100],
            "_authorization": {
                "key": LOCKED_KEY,
                "user": {"name": "Alice", "email": "alice@example.com"}
            }
        }),
    );
    storage
}

/// Create a test app over `storage`.
///
/// Each call creates a fresh `AppState` (and app cache) wrapping the shared storage.
pub fn create_test_app(storage: &Arc<MemoryBlobStore>) -> axum::Router {
    create_router(AppState::new(Arc::clone(storage)))
}

/// Make a JSON POST request and return status + parsed JSON response.
pub async fn post_json(
    app: axum::Router,
    uri: &str,
    body: Value,
    auth_key: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(key) = auth_key {
        builder = builder.header(AUTH_KEY_HEADER, key);
    }
    let response = app
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| {
            json!({ "raw_body": String::from_utf8_lossy(&body).to_string() })
        })
    };
    (status, json)
}

/// Epoch milliseconds `hours` hours ago.
pub fn hours_ago(hours: i64) -> i64 {
    chrono::Utc::now().timestamp_millis() - hours * 60 * 60 * 1000
}
