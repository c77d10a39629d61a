//! Concurrent request tests.
//!
//! Requests share one router (and so one app cache) and run at the same time.

mod common;

use axum::http::StatusCode;
use futures::future::join_all;
use serde_json::json;

use objid_api::adapters::{CURRENT_SCHEMA_TAG, UPGRADE_EVENT};
use objid_api::http::{create_router, AppState};
use objid_storage::{BlobPath, BlobStore};

use common::{post_json, seeded_storage, LOCKED_KEY};

const CONCURRENT_REQUESTS: usize = 32;

#[tokio::test]
async fn test_concurrent_bindings_upgrade_once() {
    // Arrange
    let storage = seeded_storage();
    let app = create_router(AppState::new(std::sync::Arc::clone(&storage)));

    // Act
    let futures: Vec<_> = (0..CONCURRENT_REQUESTS)
        .map(|_| {
            let app = app.clone();
            async move {
                post_json(app, "/v2/getConsumption", json!({"appId": "open"}), None).await
            }
        })
        .collect();
    let results = join_all(futures).await;

    // Assert
    for (status, body) in &results {
        assert_eq!(*status, StatusCode::OK);
        assert_eq!(body["_total"], 3);
    }
    let record = storage
        .read(&BlobPath::app("open").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.value["_upgrade"], json!([CURRENT_SCHEMA_TAG]));
    let log = storage
        .read(&BlobPath::app_log("open").unwrap())
        .await
        .unwrap()
        .unwrap();
    let upgrades = log
        .value
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["eventType"] == UPGRADE_EVENT)
        .count();
    assert_eq!(upgrades, 1);
}

#[tokio::test]
async fn test_concurrent_mixed_authorization_outcomes() {
    // Arrange
    let storage = seeded_storage();
    let app = create_router(AppState::new(std::sync::Arc::clone(&storage)));

    // Act
    let futures: Vec<_> = (0..CONCURRENT_REQUESTS)
        .map(|i| {
            let app = app.clone();
            let key = if i % 2 == 0 { LOCKED_KEY } else { "wrong" };
            async move {
                post_json(
                    app,
                    "/v2/check",
                    json!({"appId": "locked", "authKey": key}),
                    None,
                )
                .await
                .0
            }
        })
        .collect();
    let statuses = join_all(futures).await;

    // Assert
    for (i, status) in statuses.iter().enumerate() {
        let expected = if i % 2 == 0 {
            StatusCode::OK
        } else {
            StatusCode::UNAUTHORIZED
        };
        assert_eq!(*status, expected, "request {i}");
    }
}
