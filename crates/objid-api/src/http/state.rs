//! Application state for HTTP handlers.

use std::sync::Arc;

use objid_domain::{AppBinder, AppCache, AppCacheConfig};
use objid_server::handlers::{
    AuthInfoHandler, CheckHandler, ConsumptionHandler, ConsumptionSummaryHandler, LogsHandler,
};
use objid_storage::BlobStore;

use crate::adapters::{BlobAppReader, BlobLogStore, TaggingUpgrader};

/// Binder type used by the HTTP layer for a storage backend.
pub type StorageBinder<S> = AppBinder<BlobAppReader<S>, TaggingUpgrader<S>>;

/// Application state shared across all HTTP handlers.
///
/// # Type Parameters
///
/// * `S` - The storage backend implementing `BlobStore`
///
/// # Architecture
///
/// The state uses adapters to bridge the storage layer to the domain layer:
/// - `BlobAppReader<S>` implements `AppReader` using `BlobStore`
/// - `BlobLogStore<S>` implements `LogStore` using `BlobStore`
/// - `TaggingUpgrader<S>` implements `AppUpgrader` using `BlobStore`
///
/// All endpoint handlers share one binder and therefore one app cache.
#[derive(Clone)]
pub struct AppState<S: BlobStore> {
    /// The storage backend.
    pub storage: Arc<S>,
    /// The process-wide app cache.
    pub cache: Arc<AppCache>,
    /// Resolves request app ids to records.
    pub binder: Arc<StorageBinder<S>>,
    pub check: Arc<CheckHandler<BlobAppReader<S>, TaggingUpgrader<S>>>,
    pub consumption: Arc<ConsumptionHandler<BlobAppReader<S>, TaggingUpgrader<S>>>,
    pub auth_info: Arc<AuthInfoHandler<BlobAppReader<S>, TaggingUpgrader<S>>>,
    pub logs: Arc<LogsHandler<BlobAppReader<S>, TaggingUpgrader<S>>>,
    pub summary: Arc<ConsumptionSummaryHandler<BlobAppReader<S>, TaggingUpgrader<S>>>,
}

impl<S: BlobStore> AppState<S> {
    /// Creates a new application state with default cache configuration.
    pub fn new(storage: Arc<S>) -> Self {
        Self::with_cache_config(storage, AppCacheConfig::default())
    }

    /// Creates a new application state with custom cache configuration.
    pub fn with_cache_config(storage: Arc<S>, cache_config: AppCacheConfig) -> Self {
        let log_store = Arc::new(BlobLogStore::new(Arc::clone(&storage)));
        let cache = Arc::new(AppCache::new(cache_config, log_store));
        Self::with_shared_cache(storage, cache)
    }

    /// Creates a new application state around an existing app cache.
    ///
    /// The cache must have been built over the same storage.
    pub fn with_shared_cache(storage: Arc<S>, cache: Arc<AppCache>) -> Self {
        let reader = Arc::new(BlobAppReader::new(Arc::clone(&storage)));
        let upgrader = Arc::new(TaggingUpgrader::new(
            Arc::clone(&storage),
            Arc::clone(&cache),
        ));
        let binder = Arc::new(AppBinder::new(reader, upgrader, Arc::clone(&cache)));

        Self {
            storage,
            cache,
            check: Arc::new(CheckHandler::new(Arc::clone(&binder))),
            consumption: Arc::new(ConsumptionHandler::new(Arc::clone(&binder))),
            auth_info: Arc::new(AuthInfoHandler::new(Arc::clone(&binder))),
            logs: Arc::new(LogsHandler::new(Arc::clone(&binder))),
            summary: Arc::new(ConsumptionSummaryHandler::new(Arc::clone(&binder))),
            binder,
        }
    }
}
