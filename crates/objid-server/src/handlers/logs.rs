//! getLogs: buffered event logs of one or more apps.

use std::collections::BTreeMap;
use std::sync::Arc;

use objid_domain::{
    validate, AppBinder, AppReader, AppUpgrader, DomainResult, LogEntry, Schema,
};
use serde_json::Value;
use tracing::instrument;

use super::app_with_key_schema;

/// Optional lower bound (epoch millis, inclusive) on returned entries.
const SINCE_FIELD: &str = "since";

/// App id → log entries, oldest first.
pub type LogsResponse = BTreeMap<String, Vec<LogEntry>>;

/// Handler for the getLogs endpoint.
pub struct LogsHandler<R, U>
where
    R: AppReader,
    U: AppUpgrader,
{
    binder: Arc<AppBinder<R, U>>,
    schema: Schema,
}

impl<R, U> LogsHandler<R, U>
where
    R: AppReader,
    U: AppUpgrader,
{
    pub fn new(binder: Arc<AppBinder<R, U>>) -> Self {
        let item = app_with_key_schema().field(SINCE_FIELD, Schema::optional(Schema::number()));
        Self {
            binder,
            schema: Schema::array_or_entity(item),
        }
    }

    #[instrument(skip_all)]
    pub async fn get_logs(&self, body: &Value) -> DomainResult<LogsResponse> {
        validate(&self.schema, body)?;

        let bindings = self.binder.bind_apps(body).await?;

        let mut response = LogsResponse::new();
        for binding in bindings {
            let since = binding.data.get(SINCE_FIELD).and_then(Value::as_f64);
            let logs = self.binder.cache().get_logs(&binding.id).await;
            let entries = logs
                .iter()
                .filter(|entry| since.map_or(true, |since| entry.timestamp as f64 >= since))
                .cloned()
                .collect();
            response.insert(binding.id, entries);
        }

        Ok(response)
    }
}
