//! Endpoint handlers.
//!
//! Handlers are transport-agnostic: they take the parsed JSON body (and the
//! caller's header key where the endpoint uses one) and return a
//! serializable response or a [`DomainError`](objid_domain::DomainError).
//! Each handler owns its validation schema, built once at construction.

mod auth_info;
mod check;
mod consumption;
mod logs;
mod summary;

pub use auth_info::{AuthInfo, AuthInfoHandler};
pub use check::{CheckHandler, CheckResponse, LOG_PROPERTY};
pub use consumption::{ConsumptionHandler, ConsumptionResponse};
pub use logs::{LogsHandler, LogsResponse};
pub use summary::{ConsumptionSummaryHandler, SummaryFilter, SummaryResponse, TypeSummary};

use objid_domain::binding::{APP_ID_FIELD, AUTH_KEY_FIELD};
use objid_domain::{ObjectSchema, Schema};
use serde_json::Value;

/// `{ appId: string }`
fn app_id_schema() -> ObjectSchema {
    ObjectSchema::new().field(APP_ID_FIELD, Schema::string())
}

/// `{ appId: string, authKey?: string }`
fn app_with_key_schema() -> ObjectSchema {
    app_id_schema().field(AUTH_KEY_FIELD, Schema::optional(Schema::string()))
}

fn app_id_of(body: &Value) -> Option<&str> {
    body.get(APP_ID_FIELD).and_then(Value::as_str)
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests;
