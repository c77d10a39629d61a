//! App resolution and binding.
//!
//! Four binding modes cover every endpoint:
//!
//! | Mode              | Missing app            | Wrong key           |
//! |-------------------|------------------------|---------------------|
//! | single, mandatory | `NotFound` (404)       | `Unauthorized` (401)|
//! | single, optional  | binding with no record | `Unauthorized` (401)|
//! | multi, mandatory  | `NotFound`, aborts     | `Unauthorized`, aborts |
//! | multi, optional   | item dropped           | `Unauthorized`, aborts |
//!
//! Mandatory and optional multi-binding are separate code paths.

mod binder;
mod traits;
mod types;

pub use binder::{AppBinder, APP_ID_FIELD, AUTH_KEY_FIELD, MISSING_APP_ID_MESSAGE};
pub use traits::{AppReader, AppUpgrader, LogStore};
pub use types::{AppBinding, AppHandle, BindOptions, BoundApp, OptionalBoundApp};

/// Registers binding metrics descriptions.
///
/// # Metrics Registered
///
/// - `objid_binding_failures_total` - Requests rejected during app binding
pub fn register_binding_metrics() {
    metrics::describe_counter!(
        "objid_binding_failures_total",
        "Total number of requests rejected while binding apps"
    );
}

#[cfg(test)]
mod tests;
