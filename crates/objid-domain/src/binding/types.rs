//! Binding result types.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::model::AppRecord;

/// Storage address of an app record, e.g. `apps://<appId>.json`.
///
/// Carried alongside bound records so handlers can write back through the
/// storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppHandle {
    pub app_id: String,
    pub path: String,
}

impl AppHandle {
    pub fn for_app(app_id: impl Into<String>) -> Self {
        let app_id = app_id.into();
        let path = format!("apps://{app_id}.json");
        Self { app_id, path }
    }
}

/// Options for single-app binding.
#[derive(Debug, Clone, Copy, Default)]
pub struct BindOptions {
    /// Skip the authorization check entirely.
    pub skip_authorization: bool,
}

impl BindOptions {
    pub fn skip_authorization() -> Self {
        Self {
            skip_authorization: true,
        }
    }
}

/// Result of mandatory single-app binding.
#[derive(Debug, Clone)]
pub struct BoundApp {
    pub id: String,
    pub record: Arc<AppRecord>,
    pub handle: AppHandle,
}

/// Result of optional single-app binding. `record` is `None` for unknown apps.
#[derive(Debug, Clone)]
pub struct OptionalBoundApp {
    pub id: String,
    pub record: Option<Arc<AppRecord>>,
    pub handle: AppHandle,
}

/// One resolved item of a multi-app request.
#[derive(Debug, Clone)]
pub struct AppBinding {
    pub id: String,
    pub record: Arc<AppRecord>,
    pub handle: AppHandle,
    /// The request item without `appId` and `authKey`.
    pub data: Map<String, Value>,
}
