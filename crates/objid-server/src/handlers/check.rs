//! Read-only consumption check.
//!
//! Accepts one `{appId, authKey?}` entry or an array of them. Entries are
//! resolved from cache or storage without upgrade; unknown apps are a valid
//! empty answer, not an error.
//!
//! A single entry with a wrong key fails the request with 401. Inside an
//! array, unauthorized entries are left out of the response instead.

use std::collections::BTreeMap;
use std::sync::Arc;

use objid_domain::binding::{AUTH_KEY_FIELD, MISSING_APP_ID_MESSAGE};
use objid_domain::{
    auth::UNAUTHORIZED_MESSAGE, is_authorized, recent_window, validate, AppBinder, AppReader,
    AppUpgrader, DomainError, DomainResult, Schema,
};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use super::{app_id_of, app_with_key_schema, now_ms};

/// Property carrying the recent-log window in each response entry.
pub const LOG_PROPERTY: &str = "_log";

/// App id → record without its authorization descriptor, plus `_log`.
pub type CheckResponse = BTreeMap<String, Value>;

/// Handler for the check endpoint.
pub struct CheckHandler<R, U>
where
    R: AppReader,
    U: AppUpgrader,
{
    binder: Arc<AppBinder<R, U>>,
    schema: Schema,
}

impl<R, U> CheckHandler<R, U>
where
    R: AppReader,
    U: AppUpgrader,
{
    pub fn new(binder: Arc<AppBinder<R, U>>) -> Self {
        Self {
            binder,
            schema: Schema::array_or_entity(app_with_key_schema()),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Checks the request against the current time.
    pub async fn check(&self, body: &Value) -> DomainResult<CheckResponse> {
        self.check_at(body, now_ms()).await
    }

    /// Checks the request with an explicit clock, in epoch milliseconds.
    #[instrument(skip(self, body))]
    pub async fn check_at(&self, body: &Value, now_ms: i64) -> DomainResult<CheckResponse> {
        validate(&self.schema, body)?;

        let (entries, single) = match body {
            Value::Array(items) => (items.iter().collect::<Vec<_>>(), false),
            other => (vec![other], true),
        };

        let mut response = CheckResponse::new();
        for entry in entries {
            let app_id = match app_id_of(entry) {
                Some(id) if !id.is_empty() => id,
                _ => return Err(DomainError::bad_request(MISSING_APP_ID_MESSAGE)),
            };
            let auth_key = entry.get(AUTH_KEY_FIELD).and_then(Value::as_str);

            let record = self.binder.lookup(app_id).await?;
            if !is_authorized(record.as_deref(), auth_key) {
                if single {
                    return Err(DomainError::unauthorized(UNAUTHORIZED_MESSAGE));
                }
                debug!(app_id, "omitting unauthorized entry from check");
                continue;
            }

            let mut value = match &record {
                Some(record) => match serde_json::to_value(record.without_authorization()) {
                    Ok(Value::Object(map)) => map,
                    Ok(_) => Map::new(),
                    Err(e) => return Err(DomainError::upstream(e.to_string())),
                },
                None => Map::new(),
            };

            let logs = self.binder.cache().get_logs(app_id).await;
            let recent = serde_json::to_value(recent_window(&logs, now_ms))
                .map_err(|e| DomainError::upstream(e.to_string()))?;
            value.insert(LOG_PROPERTY.to_string(), recent);

            response.insert(app_id.to_string(), Value::Object(value));
        }

        Ok(response)
    }
}
