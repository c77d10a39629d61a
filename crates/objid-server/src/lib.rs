//! objid-server: Endpoint orchestration and configuration
//!
//! This crate contains the request handling layer:
//! - Check handler (read-only consumption check with recent logs)
//! - getConsumption, getAuthInfo, getLogs and getConsumptionSummary handlers
//! - Configuration management
//!
//! Every handler validates the request body against its schema, binds the
//! referenced apps and builds a transport-agnostic response.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               objid-server                   │
//! ├─────────────────────────────────────────────┤
//! │  config.rs   - Configuration management     │
//! │  handlers/   - Request handlers             │
//! │    check.rs       - Consumption check       │
//! │    consumption.rs - getConsumption          │
//! │    auth_info.rs   - getAuthInfo             │
//! │    logs.rs        - getLogs                 │
//! │    summary.rs     - getConsumptionSummary   │
//! └─────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod handlers;

// Re-exports for convenience
pub use config::{ConfigLoadError, ServerConfig, StorageBackend};
pub use handlers::{
    AuthInfoHandler, CheckHandler, ConsumptionHandler, ConsumptionSummaryHandler, LogsHandler,
};
