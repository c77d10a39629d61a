//! getConsumption: every consumed id of one app.

use std::collections::BTreeMap;
use std::sync::Arc;

use objid_domain::{
    validate, AppBinder, AppReader, AppUpgrader, BindOptions, DomainResult, Schema,
};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use super::{app_id_of, app_id_schema};

/// Consumed ids per object type, including extended types.
///
/// `_total` counts only standard object types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumptionResponse {
    #[serde(flatten)]
    pub types: BTreeMap<String, Vec<u64>>,
    #[serde(rename = "_total")]
    pub total: usize,
}

/// Handler for the getConsumption endpoint.
pub struct ConsumptionHandler<R, U>
where
    R: AppReader,
    U: AppUpgrader,
{
    binder: Arc<AppBinder<R, U>>,
    schema: Schema,
}

impl<R, U> ConsumptionHandler<R, U>
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

    #[instrument(skip(self, body, auth_key))]
    pub async fn get_consumption(
        &self,
        body: &Value,
        auth_key: Option<&str>,
    ) -> DomainResult<ConsumptionResponse> {
        validate(&self.schema, body)?;

        let bound = self
            .binder
            .bind_app(app_id_of(body), auth_key, BindOptions::default())
            .await?;

        let types = bound
            .record
            .consumption
            .iter()
            .filter(|(name, _)| !name.starts_with('_'))
            .map(|(name, ids)| (name.clone(), ids.clone()))
            .collect();

        Ok(ConsumptionResponse {
            types,
            total: bound.record.standard_total(),
        })
    }
}
