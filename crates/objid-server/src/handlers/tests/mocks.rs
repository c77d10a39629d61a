//! In-memory collaborators for handler testing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use objid_domain::{
    append_bounded, AppBinder, AppCache, AppCacheConfig, AppHandle, AppReader, AppRecord,
    AppUpgrader, DomainResult, LogEntry, LogStore,
};
use tokio::sync::RwLock;

pub const UPGRADE_TAG: &str = "test-upgrade";

#[derive(Default)]
pub struct MockAppReader {
    apps: RwLock<HashMap<String, AppRecord>>,
}

impl MockAppReader {
    pub async fn add_app(&self, app_id: &str, record: AppRecord) {
        self.apps.write().await.insert(app_id.to_string(), record);
    }
}

#[async_trait]
impl AppReader for MockAppReader {
    async fn read_app(&self, app_id: &str) -> DomainResult<Option<AppRecord>> {
        Ok(self.apps.read().await.get(app_id).cloned())
    }
}

pub struct MockUpgrader;

#[async_trait]
impl AppUpgrader for MockUpgrader {
    async fn upgrade(
        &self,
        _app_id: &str,
        record: &AppRecord,
        _handle: &AppHandle,
    ) -> DomainResult<AppRecord> {
        let mut upgraded = record.clone();
        if !upgraded.has_upgrade(UPGRADE_TAG) {
            upgraded
                .upgrade
                .get_or_insert_with(Vec::new)
                .push(UPGRADE_TAG.to_string());
        }
        Ok(upgraded)
    }
}

#[derive(Default)]
pub struct MockLogStore {
    logs: RwLock<HashMap<String, Vec<LogEntry>>>,
}

impl MockLogStore {
    pub async fn add_logs(&self, app_id: &str, entries: Vec<LogEntry>) {
        self.logs.write().await.insert(app_id.to_string(), entries);
    }
}

#[async_trait]
impl LogStore for MockLogStore {
    async fn read_logs(&self, app_id: &str) -> DomainResult<Vec<LogEntry>> {
        Ok(self
            .logs
            .read()
            .await
            .get(app_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn append_log(
        &self,
        app_id: &str,
        entry: &LogEntry,
        max_entries: usize,
    ) -> DomainResult<Vec<LogEntry>> {
        let mut logs = self.logs.write().await;
        let stored = logs.remove(app_id).unwrap_or_default();
        let entries = append_bounded(stored, entry.clone(), max_entries);
        logs.insert(app_id.to_string(), entries.clone());
        Ok(entries)
    }
}

pub struct Fixture {
    pub reader: Arc<MockAppReader>,
    pub logs: Arc<MockLogStore>,
    pub binder: Arc<AppBinder<MockAppReader, MockUpgrader>>,
}

impl Fixture {
    pub fn new() -> Self {
        let reader = Arc::new(MockAppReader::default());
        let logs = Arc::new(MockLogStore::default());
        let cache = Arc::new(AppCache::new(
            AppCacheConfig::default(),
            Arc::clone(&logs) as Arc<dyn LogStore>,
        ));
        let binder = Arc::new(AppBinder::new(
            Arc::clone(&reader),
            Arc::new(MockUpgrader),
            cache,
        ));
        Self {
            reader,
            logs,
            binder,
        }
    }
}
