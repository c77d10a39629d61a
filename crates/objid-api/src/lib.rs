//! objid-api: HTTP API layer
//!
//! This crate exposes the object ID endpoints over HTTP:
//! - REST routes for check, getConsumption, getAuthInfo, getLogs and
//!   getConsumptionSummary
//! - Storage adapters bridging blob storage to the domain traits
//! - Request middleware (request ids, logging, tracing spans, CORS)
//! - Observability (structured logging, Prometheus metrics)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 objid-api                    │
//! ├─────────────────────────────────────────────┤
//! │  http/          - Axum routes and state     │
//! │  adapters.rs    - BlobStore → domain traits │
//! │  middleware/    - Tower layers              │
//! │  observability/ - Logging and metrics       │
//! └─────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod http;
pub mod middleware;
pub mod observability;
