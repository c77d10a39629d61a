//! getAuthInfo: authorization state of one app.

use std::sync::Arc;

use objid_domain::{
    is_authorized, validate, AppBinder, AppReader, AppUpgrader, BindOptions, DomainResult, Schema,
};
use serde::Serialize;
use serde_json::Value;

use super::{app_id_of, app_id_schema};

/// Authorization state of an app as seen by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthInfo {
    /// The app is protected by a key.
    pub authorized: bool,
    /// Informational user metadata from the authorization descriptor.
    pub user: Option<Value>,
    /// The caller's key grants access.
    pub valid: bool,
}

/// Handler for the getAuthInfo endpoint.
///
/// Never fails on a wrong key; unknown apps report as open.
pub struct AuthInfoHandler<R, U>
where
    R: AppReader,
    U: AppUpgrader,
{
    binder: Arc<AppBinder<R, U>>,
    schema: Schema,
}

impl<R, U> AuthInfoHandler<R, U>
where
    R: AppReader,
    U: AppUpgrader,
{
    pub fn new(binder: Arc<AppBinder<R, U>>) -> Self {
        Self {
            binder,
            schema: app_id_schema().into(),
        }
    }

    pub async fn get_auth_info(
        &self,
        body: &Value,
        auth_key: Option<&str>,
    ) -> DomainResult<AuthInfo> {
        validate(&self.schema, body)?;

        let bound = self
            .binder
            .bind_app_optional(app_id_of(body), auth_key, BindOptions::skip_authorization())
            .await?;

        let record = bound.record.as_deref();
        Ok(AuthInfo {
            authorized: record.is_some_and(|r| r.is_protected()),
            user: record
                .and_then(|r| r.authorization.as_ref())
                .and_then(|a| a.user.clone()),
            valid: is_authorized(record, auth_key),
        })
    }
}
