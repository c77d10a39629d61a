use std::sync::Arc;

use serde_json::json;

use super::mocks::{new_cache, MockAppReader, MockUpgrader, UPGRADE_TAG};
use crate::binding::{AppBinder, BindOptions, MISSING_APP_ID_MESSAGE};
use crate::error::DomainError;
use crate::model::{AppRecord, AuthorizationDescriptor};

fn open_app() -> AppRecord {
    AppRecord::new().with_consumption("codeunit", vec![50000, 50001])
}

fn protected_app(key: &str) -> AppRecord {
    AppRecord::new()
        .with_consumption("table", vec![50000])
        .with_authorization(AuthorizationDescriptor::with_key(key))
}

async fn setup() -> (
    Arc<MockAppReader>,
    Arc<MockUpgrader>,
    AppBinder<MockAppReader, MockUpgrader>,
) {
    let reader = Arc::new(MockAppReader::new());
    reader.add_app("open", open_app()).await;
    reader.add_app("locked", protected_app("k1")).await;
    reader.add_app("other", open_app()).await;
    let upgrader = Arc::new(MockUpgrader::new());
    let binder = AppBinder::new(Arc::clone(&reader), Arc::clone(&upgrader), new_cache());
    (reader, upgrader, binder)
}

// ============================================================
// Read-only lookup
// ============================================================

#[tokio::test]
async fn test_lookup_caches_found_record_without_upgrade() {
    // Arrange
    let (reader, upgrader, binder) = setup().await;

    // Act
    let record = binder.lookup("open").await.unwrap().unwrap();
    let again = binder.lookup("open").await.unwrap().unwrap();

    // Assert
    assert!(!record.has_upgrade(UPGRADE_TAG));
    assert_eq!(record, again);
    assert_eq!(reader.read_count(), 1);
    assert_eq!(upgrader.call_count(), 0);
}

#[tokio::test]
async fn test_lookup_does_not_cache_absent_apps() {
    // Arrange
    let (reader, _, binder) = setup().await;

    // Act
    assert!(binder.lookup("ghost").await.unwrap().is_none());
    assert!(binder.lookup("ghost").await.unwrap().is_none());

    // Assert
    assert_eq!(reader.read_count(), 2);
    assert!(binder.cache().get("ghost").is_none());
}

// ============================================================
// Single, mandatory
// ============================================================

#[tokio::test]
async fn test_bind_app_caches_upgraded_record() {
    // Arrange
    let (_, _, binder) = setup().await;

    // Act
    let bound = binder
        .bind_app(Some("open"), None, BindOptions::default())
        .await
        .unwrap();

    // Assert
    assert_eq!(bound.id, "open");
    assert_eq!(bound.handle.path, "apps://open.json");
    assert!(bound.record.has_upgrade(UPGRADE_TAG));
    let cached = binder.cache().get("open").unwrap();
    assert!(cached.has_upgrade(UPGRADE_TAG));
    assert_eq!(cached, bound.record);
}

#[tokio::test]
async fn test_bind_app_missing_id_is_bad_request() {
    let (_, _, binder) = setup().await;

    for app_id in [None, Some("")] {
        let result = binder.bind_app(app_id, None, BindOptions::default()).await;
        assert_eq!(
            result.unwrap_err(),
            DomainError::bad_request(MISSING_APP_ID_MESSAGE)
        );
    }
}

#[tokio::test]
async fn test_bind_app_unknown_app_is_not_found() {
    let (_, _, binder) = setup().await;

    let result = binder
        .bind_app(Some("ghost"), None, BindOptions::default())
        .await;

    assert_eq!(result.unwrap_err(), DomainError::app_not_found("ghost"));
}

#[tokio::test]
async fn test_bind_app_checks_header_key() {
    let (_, _, binder) = setup().await;

    let denied = binder
        .bind_app(Some("locked"), Some("nope"), BindOptions::default())
        .await;
    assert_eq!(denied.unwrap_err().status_code(), 401);

    let missing = binder
        .bind_app(Some("locked"), None, BindOptions::default())
        .await;
    assert_eq!(missing.unwrap_err().status_code(), 401);

    let allowed = binder
        .bind_app(Some("locked"), Some("k1"), BindOptions::default())
        .await;
    assert!(allowed.is_ok());
}

#[tokio::test]
async fn test_bind_app_can_skip_authorization() {
    let (_, _, binder) = setup().await;

    let bound = binder
        .bind_app(Some("locked"), None, BindOptions::skip_authorization())
        .await
        .unwrap();

    assert_eq!(bound.record.authorization_key(), Some("k1"));
}

#[tokio::test]
async fn test_upgrade_failure_propagates() {
    // Arrange
    let reader = Arc::new(MockAppReader::new());
    reader.add_app("broken", open_app()).await;
    let binder = AppBinder::new(
        reader,
        Arc::new(MockUpgrader::failing_for("broken")),
        new_cache(),
    );

    // Act
    let result = binder
        .bind_app(Some("broken"), None, BindOptions::default())
        .await;

    // Assert
    assert_eq!(
        result.unwrap_err(),
        DomainError::upstream("upgrade failed for broken")
    );
}

// ============================================================
// Single, optional
// ============================================================

#[tokio::test]
async fn test_bind_app_optional_missing_app_yields_no_record() {
    // Arrange
    let (_, upgrader, binder) = setup().await;

    // Act
    let bound = binder
        .bind_app_optional(Some("ghost"), Some("whatever"), BindOptions::default())
        .await
        .unwrap();

    // Assert
    assert_eq!(bound.id, "ghost");
    assert!(bound.record.is_none());
    assert_eq!(upgrader.call_count(), 0);
}

#[tokio::test]
async fn test_bind_app_optional_found_app_is_upgraded_and_checked() {
    let (_, _, binder) = setup().await;

    let bound = binder
        .bind_app_optional(Some("locked"), Some("k1"), BindOptions::default())
        .await
        .unwrap();
    assert!(bound.record.unwrap().has_upgrade(UPGRADE_TAG));

    let denied = binder
        .bind_app_optional(Some("locked"), Some("k2"), BindOptions::default())
        .await;
    assert!(matches!(denied, Err(DomainError::Unauthorized { .. })));
}

// ============================================================
// Multi, mandatory
// ============================================================

#[tokio::test]
async fn test_bind_apps_accepts_single_object() {
    let (_, _, binder) = setup().await;

    let bindings = binder
        .bind_apps(&json!({"appId": "open", "since": 5}))
        .await
        .unwrap();

    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].id, "open");
    assert_eq!(bindings[0].data.get("since"), Some(&json!(5)));
}

#[tokio::test]
async fn test_bind_apps_data_excludes_id_and_key() {
    let (_, _, binder) = setup().await;

    let bindings = binder
        .bind_apps(&json!([
            {"appId": "locked", "authKey": "k1", "ids": [1, 2], "note": "x"}
        ]))
        .await
        .unwrap();

    let data = &bindings[0].data;
    assert!(!data.contains_key("appId"));
    assert!(!data.contains_key("authKey"));
    assert_eq!(data.get("ids"), Some(&json!([1, 2])));
    assert_eq!(data.get("note"), Some(&json!("x")));
}

#[tokio::test]
async fn test_bind_apps_missing_item_aborts_with_not_found() {
    // Arrange
    let (_, _, binder) = setup().await;
    let body = json!([{"appId": "open"}, {"appId": "ghost"}, {"appId": "other"}]);

    // Act
    let result = binder.bind_apps(&body).await;

    // Assert
    assert_eq!(result.unwrap_err(), DomainError::app_not_found("ghost"));
}

#[tokio::test]
async fn test_bind_apps_stops_at_first_failure() {
    // Arrange
    let (reader, _, binder) = setup().await;
    let body = json!([
        {"appId": "locked", "authKey": "bad"},
        {"appId": "ghost"}
    ]);

    // Act
    let result = binder.bind_apps(&body).await;

    // Assert
    assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
    // The second item was never read
    assert_eq!(reader.read_count(), 1);
}

#[tokio::test]
async fn test_bind_apps_preserves_order() {
    let (_, _, binder) = setup().await;

    let bindings = binder
        .bind_apps(&json!([
            {"appId": "other"},
            {"appId": "locked", "authKey": "k1"},
            {"appId": "open"}
        ]))
        .await
        .unwrap();

    let ids: Vec<_> = bindings.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["other", "locked", "open"]);
}

#[tokio::test]
async fn test_bind_apps_item_without_app_id_is_bad_request() {
    let (_, _, binder) = setup().await;

    let result = binder.bind_apps(&json!([{"appId": "open"}, {"foo": 1}])).await;

    assert_eq!(
        result.unwrap_err(),
        DomainError::bad_request(MISSING_APP_ID_MESSAGE)
    );
}

// ============================================================
// Multi, optional
// ============================================================

#[tokio::test]
async fn test_bind_apps_optional_drops_missing_items() {
    // Arrange
    let (_, _, binder) = setup().await;
    let body = json!([{"appId": "open"}, {"appId": "ghost"}, {"appId": "other"}]);

    // Act
    let bindings = binder.bind_apps_optional(&body).await.unwrap();

    // Assert
    let ids: Vec<_> = bindings.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["open", "other"]);
}

#[tokio::test]
async fn test_bind_apps_optional_unauthorized_still_aborts() {
    let (_, _, binder) = setup().await;
    let body = json!([{"appId": "ghost"}, {"appId": "locked"}, {"appId": "open"}]);

    let result = binder.bind_apps_optional(&body).await;

    assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
}

#[tokio::test]
async fn test_bind_apps_optional_empty_array() {
    let (_, _, binder) = setup().await;

    let bindings = binder.bind_apps_optional(&json!([])).await.unwrap();

    assert!(bindings.is_empty());
}
