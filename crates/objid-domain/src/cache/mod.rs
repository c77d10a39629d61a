//! Process-wide app record and event log cache.
//!
//! The cache is constructed once at startup and injected wherever records
//! are resolved. It holds two independent Moka caches:
//!
//! - **records**: app id → last known [`AppRecord`], written explicitly with
//!   [`AppCache::set`] after a read or upgrade. Lookups are synchronous.
//! - **logs**: app id → buffered recent [`LogEntry`] values, populated lazily
//!   from the [`LogStore`] on first access and expired after a TTL.
//!
//! Absent apps are never cached: a miss always goes back to storage.
//!
//! # Example
//!
//! ```rust,ignore
//! use objid_domain::cache::{AppCache, AppCacheConfig};
//!
//! let cache = AppCache::new(AppCacheConfig::default(), log_store);
//! cache.set("app-1", record);
//! assert!(cache.get("app-1").is_some());
//! ```

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as AsyncCache;
use moka::sync::Cache;
use tracing::{debug, warn};

use crate::binding::LogStore;
use crate::error::{DomainError, DomainResult};
use crate::model::{AppRecord, LogEntry};

/// Configuration for the app cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppCacheConfig {
    /// Maximum number of cached app records.
    pub record_capacity: u64,
    /// Maximum number of apps with buffered logs.
    pub log_capacity: u64,
    /// How long buffered logs are served before re-reading the log store.
    pub log_ttl: Duration,
    /// Maximum number of entries kept per app; older entries are dropped first.
    pub max_log_entries: usize,
}

impl Default for AppCacheConfig {
    fn default() -> Self {
        Self {
            record_capacity: 100_000,
            log_capacity: 10_000,
            log_ttl: Duration::from_secs(300),
            max_log_entries: 1_000,
        }
    }
}

impl AppCacheConfig {
    pub fn with_record_capacity(mut self, capacity: u64) -> Self {
        self.record_capacity = capacity;
        self
    }

    pub fn with_log_capacity(mut self, capacity: u64) -> Self {
        self.log_capacity = capacity;
        self
    }

    pub fn with_log_ttl(mut self, ttl: Duration) -> Self {
        self.log_ttl = ttl;
        self
    }

    pub fn with_max_log_entries(mut self, max: usize) -> Self {
        self.max_log_entries = max;
        self
    }
}

/// Shared cache of app records and recent event logs.
///
/// # Thread Safety
///
/// Fully thread-safe; share it behind an `Arc`. `set` is last-writer-wins.
pub struct AppCache {
    records: Cache<String, Arc<AppRecord>>,
    logs: AsyncCache<String, Arc<Vec<LogEntry>>>,
    log_store: Arc<dyn LogStore>,
    config: AppCacheConfig,
}

impl std::fmt::Debug for AppCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCache")
            .field("config", &self.config)
            .field("record_count", &self.records.entry_count())
            .field("log_count", &self.logs.entry_count())
            .finish()
    }
}

impl AppCache {
    /// Creates a cache reading and persisting logs through `log_store`.
    pub fn new(config: AppCacheConfig, log_store: Arc<dyn LogStore>) -> Self {
        let records = Cache::builder()
            .max_capacity(config.record_capacity)
            .build();
        let logs = AsyncCache::builder()
            .max_capacity(config.log_capacity)
            .time_to_live(config.log_ttl)
            .build();

        Self {
            records,
            logs,
            log_store,
            config,
        }
    }

    pub fn config(&self) -> &AppCacheConfig {
        &self.config
    }

    /// Returns the cached record of an app.
    ///
    /// # Metrics
    ///
    /// - `objid_app_cache_hits_total` - Incremented on cache hit
    /// - `objid_app_cache_misses_total` - Incremented on cache miss
    pub fn get(&self, app_id: &str) -> Option<Arc<AppRecord>> {
        let result = self.records.get(app_id);
        if result.is_some() {
            debug!(app_id, "app cache hit");
            metrics::counter!("objid_app_cache_hits_total").increment(1);
        } else {
            debug!(app_id, "app cache miss");
            metrics::counter!("objid_app_cache_misses_total").increment(1);
        }
        result
    }

    /// Stores the record of an app, replacing any previous one.
    pub fn set(&self, app_id: &str, record: Arc<AppRecord>) {
        self.records.insert(app_id.to_string(), record);
    }

    /// Returns the buffered event log of an app.
    ///
    /// Loads from the log store when nothing is buffered. Concurrent loads
    /// for the same app are coalesced. Never fails: a log store error is
    /// logged and yields an empty log.
    pub async fn get_logs(&self, app_id: &str) -> Arc<Vec<LogEntry>> {
        match self.load_logs(app_id).await {
            Ok(entries) => entries,
            Err(error) => {
                warn!(app_id, %error, "failed to load app logs");
                Arc::new(Vec::new())
            }
        }
    }

    /// Appends an entry to the event log of an app and persists it.
    ///
    /// The stored log keeps at most `max_log_entries` entries, dropping the
    /// oldest. The buffer is replaced with what the log store holds after
    /// the append, so entries written by other instances show up too. On
    /// failure the buffer is left untouched.
    pub async fn append_log(&self, app_id: &str, entry: LogEntry) -> DomainResult<()> {
        let entries = self
            .log_store
            .append_log(app_id, &entry, self.config.max_log_entries)
            .await?;
        self.logs.insert(app_id.to_string(), Arc::new(entries)).await;
        Ok(())
    }

    /// Drops everything.
    pub fn clear(&self) {
        self.records.invalidate_all();
        self.logs.invalidate_all();
    }

    /// Approximate number of cached records.
    pub fn record_count(&self) -> u64 {
        self.records.entry_count()
    }

    /// Runs pending maintenance tasks. Useful for testing eviction.
    pub async fn run_pending_tasks(&self) {
        self.records.run_pending_tasks();
        self.logs.run_pending_tasks().await;
    }

    async fn load_logs(&self, app_id: &str) -> DomainResult<Arc<Vec<LogEntry>>> {
        let log_store = Arc::clone(&self.log_store);
        let id = app_id.to_string();
        self.logs
            .try_get_with(app_id.to_string(), async move {
                let entries = log_store.read_logs(&id).await?;
                Ok::<_, DomainError>(Arc::new(entries))
            })
            .await
            .map_err(|e| (*e).clone())
    }
}

/// Registers app cache metrics descriptions.
///
/// Call once during application startup, after the metrics recorder is
/// installed.
///
/// # Metrics Registered
///
/// - `objid_app_cache_hits_total` - Total number of app cache hits
/// - `objid_app_cache_misses_total` - Total number of app cache misses
pub fn register_app_cache_metrics() {
    metrics::describe_counter!(
        "objid_app_cache_hits_total",
        "Total number of app record cache hits"
    );
    metrics::describe_counter!(
        "objid_app_cache_misses_total",
        "Total number of app record cache misses"
    );
}
