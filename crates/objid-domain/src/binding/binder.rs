//! App resolution and binding.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::auth::check_authorization;
use crate::cache::AppCache;
use crate::error::{DomainError, DomainResult};
use crate::model::AppRecord;

use super::traits::{AppReader, AppUpgrader};
use super::types::{AppBinding, AppHandle, BindOptions, BoundApp, OptionalBoundApp};

/// Request property carrying the app id.
pub const APP_ID_FIELD: &str = "appId";

/// Request property carrying a per-item authorization key.
pub const AUTH_KEY_FIELD: &str = "authKey";

/// Message for requests that do not name an app.
pub const MISSING_APP_ID_MESSAGE: &str = "missing appId";

/// Resolves app ids from a request into bound records.
///
/// Resolution goes cache first, then storage. Records read for binding are
/// upgraded and written back to the cache before the authorization check.
/// Multi-app requests are resolved strictly in request order; the first
/// failing item decides the error.
pub struct AppBinder<R, U>
where
    R: AppReader,
    U: AppUpgrader,
{
    reader: Arc<R>,
    upgrader: Arc<U>,
    cache: Arc<AppCache>,
}

impl<R, U> AppBinder<R, U>
where
    R: AppReader,
    U: AppUpgrader,
{
    pub fn new(reader: Arc<R>, upgrader: Arc<U>, cache: Arc<AppCache>) -> Self {
        Self {
            reader,
            upgrader,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<AppCache> {
        &self.cache
    }

    /// Read-only resolution: cache or storage, without upgrade.
    ///
    /// Records read from storage are cached; absent apps are not.
    #[instrument(skip(self))]
    pub async fn lookup(&self, app_id: &str) -> DomainResult<Option<Arc<AppRecord>>> {
        if let Some(record) = self.cache.get(app_id) {
            return Ok(Some(record));
        }

        match self.reader.read_app(app_id).await {
            Ok(Some(record)) => {
                let record = Arc::new(record);
                self.cache.set(app_id, Arc::clone(&record));
                Ok(Some(record))
            }
            Ok(None) => {
                debug!(app_id, "app does not exist");
                Ok(None)
            }
            Err(error) => {
                warn!(app_id, %error, "failed to read app record");
                Err(error)
            }
        }
    }

    /// Resolves and upgrades a record, caching the upgraded version.
    async fn resolve(&self, app_id: &str) -> DomainResult<Option<Arc<AppRecord>>> {
        let Some(record) = self.lookup(app_id).await? else {
            return Ok(None);
        };

        let handle = AppHandle::for_app(app_id);
        let upgraded = match self.upgrader.upgrade(app_id, &record, &handle).await {
            Ok(upgraded) => Arc::new(upgraded),
            Err(error) => {
                warn!(app_id, %error, "app upgrade failed");
                return Err(error);
            }
        };
        self.cache.set(app_id, Arc::clone(&upgraded));
        Ok(Some(upgraded))
    }

    /// Binds a single app that must exist.
    ///
    /// # Errors
    ///
    /// - `BadRequest` if `app_id` is absent or empty
    /// - `NotFound` if the app does not exist
    /// - `Unauthorized` if `auth_key` does not match (unless skipped)
    #[instrument(skip(self, auth_key))]
    pub async fn bind_app(
        &self,
        app_id: Option<&str>,
        auth_key: Option<&str>,
        options: BindOptions,
    ) -> DomainResult<BoundApp> {
        let id = require_app_id(app_id)?;

        let record = match self.resolve(id).await? {
            Some(record) => record,
            None => return Err(binding_failure(DomainError::app_not_found(id))),
        };
        if !options.skip_authorization {
            check_authorization(&record, auth_key).map_err(binding_failure)?;
        }

        Ok(BoundApp {
            id: id.to_string(),
            record,
            handle: AppHandle::for_app(id),
        })
    }

    /// Binds a single app that may not exist.
    ///
    /// Upgrade and authorization only apply when the app is found.
    #[instrument(skip(self, auth_key))]
    pub async fn bind_app_optional(
        &self,
        app_id: Option<&str>,
        auth_key: Option<&str>,
        options: BindOptions,
    ) -> DomainResult<OptionalBoundApp> {
        let id = require_app_id(app_id)?;

        let record = self.resolve(id).await?;
        if let (Some(record), false) = (&record, options.skip_authorization) {
            check_authorization(record, auth_key).map_err(binding_failure)?;
        }

        Ok(OptionalBoundApp {
            id: id.to_string(),
            record,
            handle: AppHandle::for_app(id),
        })
    }

    /// Binds every item of a multi-app request body; every app must exist.
    ///
    /// `body` is a single `{appId, authKey?, ...}` object or an array of them.
    /// Aborts on the first missing or unauthorized item.
    #[instrument(skip_all)]
    pub async fn bind_apps(&self, body: &Value) -> DomainResult<Vec<AppBinding>> {
        let items = request_items(body);
        let mut bindings = Vec::with_capacity(items.len());

        for item in items {
            let (id, auth_key, data) = split_item(item)?;
            let record = match self.resolve(id).await? {
                Some(record) => record,
                None => return Err(binding_failure(DomainError::app_not_found(id))),
            };
            check_authorization(&record, auth_key).map_err(binding_failure)?;

            bindings.push(AppBinding {
                id: id.to_string(),
                record,
                handle: AppHandle::for_app(id),
                data,
            });
        }

        Ok(bindings)
    }

    /// Binds the items of a multi-app request body that exist.
    ///
    /// Unknown apps are dropped. An existing app with a wrong key still
    /// aborts the whole request.
    #[instrument(skip_all)]
    pub async fn bind_apps_optional(&self, body: &Value) -> DomainResult<Vec<AppBinding>> {
        let items = request_items(body);
        let mut bindings = Vec::with_capacity(items.len());

        for item in items {
            let (id, auth_key, data) = split_item(item)?;
            let Some(record) = self.resolve(id).await? else {
                debug!(app_id = id, "dropping unknown app from request");
                continue;
            };
            check_authorization(&record, auth_key).map_err(binding_failure)?;

            bindings.push(AppBinding {
                id: id.to_string(),
                record,
                handle: AppHandle::for_app(id),
                data,
            });
        }

        Ok(bindings)
    }
}

fn require_app_id(app_id: Option<&str>) -> DomainResult<&str> {
    match app_id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(binding_failure(DomainError::bad_request(MISSING_APP_ID_MESSAGE))),
    }
}

/// A single object body is treated as a one-item request.
fn request_items(body: &Value) -> Vec<&Value> {
    match body {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

/// Splits a request item into its app id, authorization key and remaining data.
fn split_item(item: &Value) -> DomainResult<(&str, Option<&str>, Map<String, Value>)> {
    let Value::Object(map) = item else {
        return Err(binding_failure(DomainError::bad_request(MISSING_APP_ID_MESSAGE)));
    };
    let id = require_app_id(map.get(APP_ID_FIELD).and_then(Value::as_str))?;
    let auth_key = map.get(AUTH_KEY_FIELD).and_then(Value::as_str);
    let data = map
        .iter()
        .filter(|(key, _)| key.as_str() != APP_ID_FIELD && key.as_str() != AUTH_KEY_FIELD)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Ok((id, auth_key, data))
}

fn binding_failure(error: DomainError) -> DomainError {
    debug!(%error, status = error.status_code(), "app binding failed");
    metrics::counter!("objid_binding_failures_total").increment(1);
    error
}
