//! Router assembly and endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{debug, error};

use objid_server::handlers::{
    AuthInfo, CheckResponse, ConsumptionResponse, LogsResponse, SummaryResponse,
};
use objid_storage::BlobStore;

use super::error::ApiResult;
use super::extract::JsonBadRequest;
use super::state::AppState;
use crate::observability::{metrics_handler, MetricsState};

/// Header carrying the caller's authorization key.
pub const AUTH_KEY_HEADER: &str = "Ninja-Auth-Key";

/// 1 MiB.
pub const DEFAULT_BODY_LIMIT: usize = 1 << 20;

pub const DEFAULT_METRICS_PATH: &str = "/metrics";

/// Where and from what the Prometheus endpoint is served.
#[derive(Clone)]
pub struct MetricsEndpoint {
    pub state: MetricsState,
    pub path: String,
}

impl MetricsEndpoint {
    pub fn new(state: MetricsState) -> Self {
        Self {
            state,
            path: DEFAULT_METRICS_PATH.to_string(),
        }
    }

    pub fn at(self, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..self
        }
    }
}

/// Router construction options.
#[derive(Clone)]
pub struct RouterOptions {
    /// Largest accepted body on the API routes.
    pub body_limit: usize,
    /// Prometheus endpoint; `None` leaves it unmounted.
    pub metrics: Option<MetricsEndpoint>,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            body_limit: DEFAULT_BODY_LIMIT,
            metrics: None,
        }
    }
}

/// Router with the default body limit and no metrics endpoint.
pub fn create_router<S: BlobStore>(state: AppState<S>) -> Router {
    create_router_with_options(state, RouterOptions::default())
}

pub fn create_router_with_body_limit<S: BlobStore>(
    state: AppState<S>,
    body_limit: usize,
) -> Router {
    create_router_with_options(
        state,
        RouterOptions {
            body_limit,
            ..RouterOptions::default()
        },
    )
}

/// Full router: the `/v2` endpoints and `/ready` behind the body limit, plus
/// `/health` and, when configured, the metrics endpoint.
pub fn create_router_with_options<S: BlobStore>(
    state: AppState<S>,
    options: RouterOptions,
) -> Router {
    let stateful = Router::new()
        .route("/v2/check", post(check::<S>))
        .route("/v2/getConsumption", post(get_consumption::<S>))
        .route("/v2/getAuthInfo", post(get_auth_info::<S>))
        .route("/v2/getLogs", post(get_logs::<S>))
        .route(
            "/v2/getConsumptionSummary",
            post(get_consumption_summary::<S>),
        )
        .route("/ready", get(readiness_check::<S>))
        .with_state(Arc::new(state))
        .layer(RequestBodyLimitLayer::new(options.body_limit));

    let router = stateful.route("/health", get(health_check));

    match options.metrics {
        Some(endpoint) => router.merge(
            Router::new()
                .route(&endpoint.path, get(metrics_handler))
                .with_state(endpoint.state),
        ),
        None => router,
    }
}

/// Caller's key from [`AUTH_KEY_HEADER`], when present and valid UTF-8.
fn auth_key(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTH_KEY_HEADER)?.to_str().ok()
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// 200 while storage answers its health check, 503 otherwise.
async fn readiness_check<S: BlobStore>(
    State(state): State<Arc<AppState<S>>>,
) -> (StatusCode, Json<Value>) {
    let storage_ok = match state.storage.health_check().await {
        Ok(health) => health.healthy,
        Err(e) => {
            error!(error = %e, "readiness: storage health check failed");
            false
        }
    };

    if storage_ok {
        (
            StatusCode::OK,
            Json(json!({ "status": "ready", "checks": { "storage": "ok" } })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not_ready", "checks": { "storage": "unavailable" } })),
        )
    }
}

/// Keys travel inside the body items, never in the header.
async fn check<S: BlobStore>(
    State(state): State<Arc<AppState<S>>>,
    JsonBadRequest(body): JsonBadRequest<Value>,
) -> ApiResult<Json<CheckResponse>> {
    let response = state.check.check(&body).await.map_err(|e| {
        debug!(error = %e, "check rejected");
        e
    })?;
    Ok(Json(response))
}

async fn get_consumption<S: BlobStore>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    JsonBadRequest(body): JsonBadRequest<Value>,
) -> ApiResult<Json<ConsumptionResponse>> {
    let key = auth_key(&headers);
    Ok(Json(state.consumption.get_consumption(&body, key).await?))
}

async fn get_auth_info<S: BlobStore>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    JsonBadRequest(body): JsonBadRequest<Value>,
) -> ApiResult<Json<AuthInfo>> {
    let key = auth_key(&headers);
    Ok(Json(state.auth_info.get_auth_info(&body, key).await?))
}

async fn get_logs<S: BlobStore>(
    State(state): State<Arc<AppState<S>>>,
    JsonBadRequest(body): JsonBadRequest<Value>,
) -> ApiResult<Json<LogsResponse>> {
    Ok(Json(state.logs.get_logs(&body).await?))
}

async fn get_consumption_summary<S: BlobStore>(
    State(state): State<Arc<AppState<S>>>,
    JsonBadRequest(body): JsonBadRequest<Value>,
) -> ApiResult<Json<SummaryResponse>> {
    Ok(Json(state.summary.get_summary(&body).await?))
}
