//! Collaborator traits needed by the binder and the app cache.

use async_trait::async_trait;

use crate::error::DomainResult;
use crate::model::{AppRecord, LogEntry};

use super::types::AppHandle;

/// Reads app records from persistent storage.
#[async_trait]
pub trait AppReader: Send + Sync {
    /// Reads the record of an app. Returns `Ok(None)` when the app does not exist.
    async fn read_app(&self, app_id: &str) -> DomainResult<Option<AppRecord>>;
}

/// Brings a stored record up to the current schema.
///
/// Implementations must be idempotent: upgrading an already current record
/// returns it unchanged. Failures propagate to the caller as-is.
#[async_trait]
pub trait AppUpgrader: Send + Sync {
    async fn upgrade(
        &self,
        app_id: &str,
        record: &AppRecord,
        handle: &AppHandle,
    ) -> DomainResult<AppRecord>;
}

/// Persistent source of per-app event logs.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Reads all persisted entries of an app, oldest first.
    async fn read_logs(&self, app_id: &str) -> DomainResult<Vec<LogEntry>>;

    /// Appends `entry` to the persisted log of an app, keeping the newest
    /// `max_entries`. Returns the log as stored afterwards.
    async fn append_log(
        &self,
        app_id: &str,
        entry: &LogEntry,
        max_entries: usize,
    ) -> DomainResult<Vec<LogEntry>>;
}
