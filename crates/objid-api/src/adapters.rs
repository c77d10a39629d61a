//! Adapters that bridge storage layer to domain layer.
//!
//! The domain layer (objid-domain) defines abstract collaborator traits:
//! - `AppReader`: Read app records
//! - `AppUpgrader`: Bring a record up to the current schema
//! - `LogStore`: Read and write per-app event logs
//!
//! The storage layer (objid-storage) implements `BlobStore` with concrete backends.
//!
//! This module provides adapters that implement domain traits using `BlobStore`,
//! enabling the API layer to connect storage implementations to domain logic.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use objid_domain::{
    append_bounded, AppCache, AppHandle, AppReader, AppRecord, AppUpgrader, DomainError,
    DomainResult, LogEntry, LogStore,
};
use objid_storage::{Blob, BlobPath, BlobStore, StorageError};

/// Tag recorded in `_upgrade` once a record has been brought to the current schema.
pub const CURRENT_SCHEMA_TAG: &str = "v2";

/// Event type of the log entry written after an upgrade.
pub const UPGRADE_EVENT: &str = "upgrade";

/// User recorded on log entries written by the service itself.
const SYSTEM_USER: &str = "system";

/// Attempts at an optimistic update before giving up on version conflicts.
const MAX_UPDATE_ATTEMPTS: usize = 5;

/// Maps a storage failure into the domain.
///
/// A malformed app id is the caller's fault; everything else is upstream.
fn storage_error(error: StorageError) -> DomainError {
    match error {
        StorageError::InvalidPath { message } => DomainError::bad_request(message),
        other => DomainError::upstream(format!("storage error: {other}")),
    }
}

fn decode<T: serde::de::DeserializeOwned>(path: &BlobPath, value: Value) -> DomainResult<T> {
    serde_json::from_value(value)
        .map_err(|e| DomainError::upstream(format!("malformed blob at {path}: {e}")))
}

fn encode<T: serde::Serialize>(value: &T) -> DomainResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| DomainError::upstream(format!("failed to serialize blob: {e}")))
}

/// Adapter that implements `AppReader` using a `BlobStore`.
pub struct BlobAppReader<S: BlobStore> {
    storage: Arc<S>,
}

impl<S: BlobStore> BlobAppReader<S> {
    /// Creates a new adapter wrapping the given storage.
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl<S: BlobStore> AppReader for BlobAppReader<S> {
    #[instrument(skip(self))]
    async fn read_app(&self, app_id: &str) -> DomainResult<Option<AppRecord>> {
        let path = BlobPath::app(app_id).map_err(storage_error)?;
        match self.storage.read(&path).await.map_err(storage_error)? {
            Some(blob) => decode(&path, blob.value).map(Some),
            None => Ok(None),
        }
    }
}

/// Adapter that implements `LogStore` using a `BlobStore`.
///
/// The log of an app is stored as a JSON array at `logs://<appId>.json`.
pub struct BlobLogStore<S: BlobStore> {
    storage: Arc<S>,
}

impl<S: BlobStore> BlobLogStore<S> {
    /// Creates a new adapter wrapping the given storage.
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl<S: BlobStore> LogStore for BlobLogStore<S> {
    #[instrument(skip(self))]
    async fn read_logs(&self, app_id: &str) -> DomainResult<Vec<LogEntry>> {
        let path = BlobPath::app_log(app_id).map_err(storage_error)?;
        match self.storage.read(&path).await.map_err(storage_error)? {
            Some(blob) => decode(&path, blob.value),
            None => Ok(Vec::new()),
        }
    }

    #[instrument(skip(self, entry))]
    async fn append_log(
        &self,
        app_id: &str,
        entry: &LogEntry,
        max_entries: usize,
    ) -> DomainResult<Vec<LogEntry>> {
        let path = BlobPath::app_log(app_id).map_err(storage_error)?;
        let mut appended = Vec::new();

        // Merge into what is stored now; other instances append to the same blob.
        update_with_retry(self.storage.as_ref(), &path, |current| {
            let stored: Vec<LogEntry> = match current {
                Some(blob) => decode(&path, blob.value.clone())?,
                None => Vec::new(),
            };
            appended = append_bounded(stored, entry.clone(), max_entries);
            encode(&appended).map(Some)
        })
        .await?;

        Ok(appended)
    }
}

/// Read-modify-write against a blob, retrying on version conflicts.
///
/// `modify` receives the current blob and returns the new value, or `None`
/// when nothing needs to be written. Returns the blob as stored afterwards.
async fn update_with_retry<S, F>(
    storage: &S,
    path: &BlobPath,
    mut modify: F,
) -> DomainResult<Option<Blob>>
where
    S: BlobStore + ?Sized,
    F: FnMut(Option<&Blob>) -> DomainResult<Option<Value>>,
{
    for attempt in 1..=MAX_UPDATE_ATTEMPTS {
        let current = storage.read(path).await.map_err(storage_error)?;
        let Some(value) = modify(current.as_ref())? else {
            return Ok(current);
        };
        let expected = current.as_ref().map(|b| b.version);

        match storage.optimistic_update(path, expected, value).await {
            Ok(blob) => return Ok(Some(blob)),
            Err(StorageError::VersionConflict { .. }) => {
                debug!(%path, attempt, "version conflict, retrying update");
            }
            Err(other) => return Err(storage_error(other)),
        }
    }

    Err(DomainError::upstream(format!(
        "gave up updating {path} after {MAX_UPDATE_ATTEMPTS} version conflicts"
    )))
}

/// Stored blob with [`CURRENT_SCHEMA_TAG`] added to `_upgrade`, or `None` when
/// it is already there. Every other property is left as stored.
fn tag_current_schema(path: &BlobPath, stored: &Value) -> DomainResult<Option<Value>> {
    let mut value = stored.clone();
    let tags = value
        .as_object_mut()
        .map(|object| {
            object
                .entry("_upgrade")
                .or_insert_with(|| Value::Array(Vec::new()))
        })
        .and_then(Value::as_array_mut)
        .ok_or_else(|| {
            DomainError::upstream(format!("malformed blob at {path}: cannot record upgrade"))
        })?;

    if tags.iter().any(|t| t.as_str() == Some(CURRENT_SCHEMA_TAG)) {
        return Ok(None);
    }
    tags.push(Value::from(CURRENT_SCHEMA_TAG));
    Ok(Some(value))
}

/// Default upgrader: marks records with [`CURRENT_SCHEMA_TAG`].
///
/// Records that already carry the tag are returned untouched. Otherwise the
/// tag is appended to `_upgrade` of the stored blob, which is updated
/// optimistically, and an `upgrade` event is appended to the app's log. An
/// app deleted since it was read is not written back.
pub struct TaggingUpgrader<S: BlobStore> {
    storage: Arc<S>,
    cache: Arc<AppCache>,
}

impl<S: BlobStore> TaggingUpgrader<S> {
    /// Creates a new upgrader writing to `storage` and logging through `cache`.
    pub fn new(storage: Arc<S>, cache: Arc<AppCache>) -> Self {
        Self { storage, cache }
    }
}

#[async_trait]
impl<S: BlobStore> AppUpgrader for TaggingUpgrader<S> {
    #[instrument(skip(self, record, handle))]
    async fn upgrade(
        &self,
        app_id: &str,
        record: &AppRecord,
        handle: &AppHandle,
    ) -> DomainResult<AppRecord> {
        if record.has_upgrade(CURRENT_SCHEMA_TAG) {
            return Ok(record.clone());
        }

        let path = BlobPath::parse(&handle.path).map_err(storage_error)?;
        let mut upgraded = record.clone();
        let mut tagged_by_us = false;

        update_with_retry(self.storage.as_ref(), &path, |current| {
            let Some(blob) = current else {
                debug!(app_id, "app deleted before upgrade");
                tagged_by_us = false;
                upgraded = record.clone();
                return Ok(None);
            };
            // Tag what is stored now, which may be newer than `record`.
            let tagged = tag_current_schema(&path, &blob.value)?;
            tagged_by_us = tagged.is_some();
            upgraded = decode(&path, tagged.as_ref().unwrap_or(&blob.value).clone())?;
            Ok(tagged)
        })
        .await
        .map_err(|error| {
            warn!(app_id, %error, "app upgrade failed");
            error
        })?;

        if tagged_by_us {
            let entry = LogEntry::new(
                UPGRADE_EVENT,
                chrono::Utc::now().timestamp_millis(),
                SYSTEM_USER,
                serde_json::json!({ "tag": CURRENT_SCHEMA_TAG }),
            );
            if let Err(error) = self.cache.append_log(app_id, entry).await {
                warn!(app_id, %error, "failed to record upgrade event");
            }
        }

        Ok(upgraded)
    }
}
