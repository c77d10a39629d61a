//! API middleware.
//!
//! Includes:
//! - Request ID generation and propagation
//! - HTTP request metrics
//! - Per-request tracing span and access log
//! - CORS configuration

mod metrics;
mod request_id;
mod telemetry;

pub use metrics::{MetricsLayer, RequestMetrics};
pub use request_id::{request_id_of, RequestIdLayer, MAX_REQUEST_ID_LENGTH, REQUEST_ID_HEADER};
pub use telemetry::{RequestTelemetry, RequestTelemetryLayer};

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};

/// Creates a CORS layer with permissive settings.
///
/// Extension clients call the API from arbitrary origins.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any)
}

/// Wraps a router in the full middleware stack.
///
/// Layers are applied bottom-to-top, so at request time:
/// 1. CORS answers preflights before anything else runs
/// 2. RequestIdLayer ensures every request carries an id
/// 3. MetricsLayer records the request
/// 4. RequestTelemetryLayer opens the request span and logs inside it
pub fn with_middleware(router: Router, metrics: Arc<RequestMetrics>) -> Router {
    router
        .layer(RequestTelemetryLayer::new())
        .layer(MetricsLayer::new(metrics))
        .layer(RequestIdLayer::new())
        .layer(cors_layer())
}

#[cfg(test)]
mod tests;
