//! BlobStore trait definition.

use std::fmt;

use async_trait::async_trait;

use crate::error::{HealthStatus, StorageError, StorageResult};

/// Scheme for app record blobs.
pub const APPS_SCHEME: &str = "apps://";

/// Scheme for app event log blobs.
pub const LOGS_SCHEME: &str = "logs://";

/// Maximum allowed app id length.
pub const MAX_APP_ID_LENGTH: usize = 256;

/// Address of a blob, e.g. `apps://<appId>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobPath(String);

impl BlobPath {
    /// Path of the record blob for an app.
    pub fn app(app_id: &str) -> StorageResult<Self> {
        validate_app_id(app_id)?;
        Ok(Self(format!("{APPS_SCHEME}{app_id}.json")))
    }

    /// Path of the event log blob for an app.
    pub fn app_log(app_id: &str) -> StorageResult<Self> {
        validate_app_id(app_id)?;
        Ok(Self(format!("{LOGS_SCHEME}{app_id}.json")))
    }

    /// Parses a path produced by [`BlobPath::app`] or [`BlobPath::app_log`].
    pub fn parse(value: &str) -> StorageResult<Self> {
        let rest = value
            .strip_prefix(APPS_SCHEME)
            .or_else(|| value.strip_prefix(LOGS_SCHEME))
            .ok_or_else(|| StorageError::InvalidPath {
                message: format!("unknown scheme in '{value}'"),
            })?;
        let app_id = rest
            .strip_suffix(".json")
            .ok_or_else(|| StorageError::InvalidPath {
                message: format!("'{value}' must end with .json"),
            })?;
        validate_app_id(app_id)?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validates an app id before it is embedded in a blob path.
pub fn validate_app_id(app_id: &str) -> StorageResult<()> {
    if app_id.is_empty() {
        return Err(StorageError::InvalidPath {
            message: "app id cannot be empty".to_string(),
        });
    }
    if app_id.len() > MAX_APP_ID_LENGTH {
        return Err(StorageError::InvalidPath {
            message: format!(
                "app id exceeds maximum length of {} (got {})",
                MAX_APP_ID_LENGTH,
                app_id.len()
            ),
        });
    }
    if app_id
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_control())
    {
        return Err(StorageError::InvalidPath {
            message: format!("app id contains invalid characters: {app_id:?}"),
        });
    }
    Ok(())
}

/// A stored JSON document with its optimistic-concurrency version.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub value: serde_json::Value,
    /// Incremented on every successful update, starting at 1.
    pub version: u64,
}

/// Abstract key-value blob storage.
///
/// Implementations must be thread-safe (Send + Sync) and support
/// async operations.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Reads a blob. Returns `Ok(None)` when nothing is stored at `path`.
    async fn read(&self, path: &BlobPath) -> StorageResult<Option<Blob>>;

    /// Replaces the blob at `path` if its current version equals `expected_version`.
    ///
    /// `expected_version = None` means the blob must not exist yet.
    /// Fails with [`StorageError::VersionConflict`] otherwise.
    async fn optimistic_update(
        &self,
        path: &BlobPath,
        expected_version: Option<u64>,
        value: serde_json::Value,
    ) -> StorageResult<Blob>;

    /// Checks backend health.
    async fn health_check(&self) -> StorageResult<HealthStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_path_format() {
        let path = BlobPath::app("4a5c1d2e").unwrap();
        assert_eq!(path.as_str(), "apps://4a5c1d2e.json");
    }

    #[test]
    fn test_app_log_path_format() {
        let path = BlobPath::app_log("4a5c1d2e").unwrap();
        assert_eq!(path.as_str(), "logs://4a5c1d2e.json");
    }

    #[test]
    fn test_parse_round_trips_app_path() {
        let path = BlobPath::parse("apps://my-app.json").unwrap();
        assert_eq!(path, BlobPath::app("my-app").unwrap());
    }

    #[test]
    fn test_parse_rejects_unknown_scheme() {
        let result = BlobPath::parse("files://my-app.json");
        assert!(matches!(result, Err(StorageError::InvalidPath { .. })));
    }

    #[test]
    fn test_parse_rejects_missing_extension() {
        let result = BlobPath::parse("apps://my-app");
        assert!(matches!(result, Err(StorageError::InvalidPath { .. })));
    }

    #[test]
    fn test_app_id_validation() {
        assert!(validate_app_id("").is_err());
        assert!(validate_app_id("../etc/passwd").is_err());
        assert!(validate_app_id(&"x".repeat(MAX_APP_ID_LENGTH + 1)).is_err());
        assert!(validate_app_id(&"x".repeat(MAX_APP_ID_LENGTH)).is_ok());
        assert!(validate_app_id("0d7a37c4-5e5b-4c0a-9d0c-1a0f6b0e7d21").is_ok());
    }
}
