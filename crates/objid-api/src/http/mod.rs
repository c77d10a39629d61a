//! HTTP REST API endpoints.
//!
//! Implements the object ID REST API using Axum.
//!
//! # Endpoints
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/v2/check` | POST | Consumption check with recent logs |
//! | `/v2/getConsumption` | POST | Consumed ids of one app |
//! | `/v2/getAuthInfo` | POST | Authorization state of one app |
//! | `/v2/getLogs` | POST | Event logs of several apps |
//! | `/v2/getConsumptionSummary` | POST | Filtered consumption totals |
//! | `/health` | GET | Liveness |
//! | `/ready` | GET | Readiness (storage health) |
//! | `/metrics` | GET | Prometheus exposition, when enabled |
//!
//! Endpoints that take the caller's key read it from the `Ninja-Auth-Key`
//! header; check and the multi-app endpoints carry `authKey` per body item.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::{error_codes, ApiError, ApiResult};
pub use extract::JsonBadRequest;
pub use routes::{
    create_router, create_router_with_body_limit, create_router_with_options, MetricsEndpoint,
    RouterOptions, AUTH_KEY_HEADER, DEFAULT_BODY_LIMIT, DEFAULT_METRICS_PATH,
};
pub use state::{AppState, StorageBinder};
