//! objid-domain: Core request pipeline shared by every endpoint
//!
//! This crate contains:
//! - The app record data model and consumption accounting
//! - A schema-driven payload validator
//! - The authorization check
//! - The process-wide app cache
//! - The app binder (single/multi × mandatory/optional resolution)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                objid-domain                  │
//! ├─────────────────────────────────────────────┤
//! │  model/      - AppRecord, LogEntry          │
//! │  validation/ - Schema tree & validator      │
//! │  auth.rs     - Authorization key check      │
//! │  cache/      - App record & log cache       │
//! │  binding/    - App resolution & binding     │
//! └─────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod binding;
pub mod cache;
pub mod error;
pub mod model;
pub mod validation;

// Re-export commonly used types at the crate root
pub use auth::{check_authorization, is_authorized};
pub use binding::{
    AppBinder, AppBinding, AppHandle, AppReader, AppUpgrader, BindOptions, BoundApp, LogStore,
    OptionalBoundApp,
};
pub use cache::{AppCache, AppCacheConfig};
pub use error::{DomainError, DomainResult};
pub use model::{
    append_bounded, recent_window, AppRecord, AuthorizationDescriptor, IdRange, LogEntry,
    RECENT_LOG_WINDOW_MS,
};
pub use validation::{validate, ObjectSchema, Schema, ValidatorOutcome};
