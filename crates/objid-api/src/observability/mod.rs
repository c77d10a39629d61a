//! Observability infrastructure.
//!
//! This module provides:
//! - Structured logging configuration
//! - Prometheus metrics recorder and endpoint

mod logging;
mod metrics;

pub use logging::{init_logging, json_subscriber, parse_log_level, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, register_default_metrics, MetricsError, MetricsState,
};
