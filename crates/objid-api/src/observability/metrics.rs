//! Prometheus exposition.
//!
//! Code records through the `metrics` facade; the recorder installed here
//! renders everything recorded for `GET /metrics`:
//!
//! | Metric | Kind |
//! |--------|------|
//! | `objid_http_requests_total` | counter (method, route, status_class) |
//! | `objid_http_request_duration_seconds` | histogram (same labels) |
//! | `objid_app_cache_hits_total` | counter |
//! | `objid_app_cache_misses_total` | counter |
//! | `objid_binding_failures_total` | counter |

use axum::{
    extract::State,
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Handle to the installed recorder; cheap to clone.
#[derive(Clone)]
pub struct MetricsState {
    handle: PrometheusHandle,
}

impl MetricsState {
    pub fn new(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("failed to install Prometheus recorder: {0}")]
    Install(#[from] BuildError),
}

/// Installs the process-wide Prometheus recorder. Only the first call in a
/// process can succeed.
pub fn init_metrics() -> Result<MetricsState, MetricsError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    register_default_metrics();
    Ok(MetricsState::new(handle))
}

/// Attaches help text to every metric the service records.
pub fn register_default_metrics() {
    metrics::describe_counter!(
        "objid_http_requests_total",
        "HTTP requests served, by method, route and status class"
    );
    metrics::describe_histogram!(
        "objid_http_request_duration_seconds",
        metrics::Unit::Seconds,
        "Time to produce an HTTP response"
    );

    objid_domain::cache::register_app_cache_metrics();
    objid_domain::binding::register_binding_metrics();
}

pub async fn metrics_handler(State(state): State<MetricsState>) -> Response {
    ([(CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], state.render()).into_response()
}
