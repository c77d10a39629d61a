//! getConsumptionSummary: filtered consumption totals for several apps.
//!
//! Each item may carry a `filter` whose shape depends on its `kind`:
//!
//! ```json
//! { "kind": "types", "types": ["table", "page"] }
//! { "kind": "range", "from": 50000, "to": 50099 }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use objid_domain::{
    validate, AppBinder, AppReader, AppRecord, AppUpgrader, DomainError, DomainResult,
    ObjectSchema, Schema, ValidatorOutcome,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use super::app_with_key_schema;

const FILTER_FIELD: &str = "filter";
const KIND_FIELD: &str = "kind";

/// Restricts which consumed ids are counted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SummaryFilter {
    /// Only the named object types.
    Types { types: Vec<String> },
    /// Only ids within `from..=to`.
    Range { from: f64, to: f64 },
}

impl SummaryFilter {
    /// Counts the matching ids across the standard object types of `record`.
    pub fn count(&self, record: &AppRecord) -> usize {
        match self {
            SummaryFilter::Types { types } => record
                .standard_consumption()
                .filter(|(name, _)| types.iter().any(|t| t == name))
                .map(|(_, ids)| ids.len())
                .sum(),
            SummaryFilter::Range { from, to } => record
                .standard_consumption()
                .flat_map(|(_, ids)| ids.iter())
                .filter(|&&id| (id as f64) >= *from && (id as f64) <= *to)
                .count(),
        }
    }
}

/// Consumption total of one app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeSummary {
    pub total: usize,
}

/// App id → summary. Unknown apps are omitted.
pub type SummaryResponse = BTreeMap<String, TypeSummary>;

/// Handler for the getConsumptionSummary endpoint.
pub struct ConsumptionSummaryHandler<R, U>
where
    R: AppReader,
    U: AppUpgrader,
{
    binder: Arc<AppBinder<R, U>>,
    schema: Schema,
}

impl<R, U> ConsumptionSummaryHandler<R, U>
where
    R: AppReader,
    U: AppUpgrader,
{
    pub fn new(binder: Arc<AppBinder<R, U>>) -> Self {
        let item = app_with_key_schema()
            .field(FILTER_FIELD, Schema::optional(Schema::function(filter_validator)));
        Self {
            binder,
            schema: Schema::array_or_entity(item),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[instrument(skip_all)]
    pub async fn get_summary(&self, body: &Value) -> DomainResult<SummaryResponse> {
        validate(&self.schema, body)?;

        let bindings = self.binder.bind_apps_optional(body).await?;

        let mut response = SummaryResponse::new();
        for binding in bindings {
            let total = match binding.data.get(FILTER_FIELD) {
                None | Some(Value::Null) => binding.record.standard_total(),
                Some(filter) => parse_filter(filter)?.count(&binding.record),
            };
            response.insert(binding.id, TypeSummary { total });
        }

        Ok(response)
    }
}

/// Chooses the filter schema from its `kind` discriminator.
fn filter_validator(value: Option<&Value>, _body: &Value) -> ValidatorOutcome {
    let Some(Value::Object(filter)) = value else {
        // Let the object check report the actual type
        return ValidatorOutcome::Delegate(types_filter_schema());
    };

    match filter.get(KIND_FIELD) {
        Some(Value::String(kind)) if kind == "types" => {
            ValidatorOutcome::Delegate(types_filter_schema())
        }
        Some(Value::String(kind)) if kind == "range" => {
            ValidatorOutcome::Delegate(range_filter_schema())
        }
        Some(Value::String(kind)) => {
            ValidatorOutcome::Fail(format!("Invalid filter kind \"{kind}\""))
        }
        Some(other) => ValidatorOutcome::Fail(format!("Invalid filter kind \"{other}\"")),
        None => ValidatorOutcome::Fail("Invalid filter kind \"\"".to_string()),
    }
}

fn types_filter_schema() -> ObjectSchema {
    ObjectSchema::new()
        .field(KIND_FIELD, Schema::string())
        .field("types", Schema::array(Schema::string()))
}

fn range_filter_schema() -> ObjectSchema {
    ObjectSchema::new()
        .field(KIND_FIELD, Schema::string())
        .field("from", Schema::number())
        .field("to", Schema::number())
}

fn parse_filter(value: &Value) -> DomainResult<SummaryFilter> {
    SummaryFilter::deserialize(value).map_err(|e| DomainError::bad_request(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> AppRecord {
        serde_json::from_value(json!({
            "table": [50000, 50001],
            "page": [50000, 50100, 50200],
            "table_50000": [1, 2, 3]
        }))
        .unwrap()
    }

    #[test]
    fn test_types_filter_counts_named_standard_types() {
        let filter = SummaryFilter::Types {
            types: vec!["page".to_string(), "table_50000".to_string()],
        };
        assert_eq!(filter.count(&record()), 3);
    }

    #[test]
    fn test_range_filter_is_inclusive() {
        let filter = SummaryFilter::Range {
            from: 50000.0,
            to: 50100.0,
        };
        assert_eq!(filter.count(&record()), 4);
    }

    #[test]
    fn test_filter_deserializes_by_kind() {
        let filter = parse_filter(&json!({"kind": "range", "from": 1, "to": 2})).unwrap();
        assert_eq!(filter, SummaryFilter::Range { from: 1.0, to: 2.0 });

        let filter = parse_filter(&json!({"kind": "types", "types": ["a"]})).unwrap();
        assert_eq!(
            filter,
            SummaryFilter::Types {
                types: vec!["a".to_string()]
            }
        );
    }

    #[test]
    fn test_filter_validator_dispatch() {
        let body = json!({});

        assert!(matches!(
            filter_validator(Some(&json!({"kind": "types"})), &body),
            ValidatorOutcome::Delegate(_)
        ));
        assert!(matches!(
            filter_validator(Some(&json!({"kind": "range"})), &body),
            ValidatorOutcome::Delegate(_)
        ));
        match filter_validator(Some(&json!({"kind": "daily"})), &body) {
            ValidatorOutcome::Fail(message) => {
                assert_eq!(message, r#"Invalid filter kind "daily""#)
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
