//! Schema-driven request payload validation.
//!
//! Validation walks the schema depth-first, visiting fields in declaration
//! order, and stops at the first violation. Structural failures use a fixed
//! message format that clients match on:
//!
//! ```text
//! Invalid property "<path>", expected <kind> but got <actual-type>
//! ```
//!
//! Function validators may fail with their own message (passed through
//! verbatim) or delegate to a schema chosen at runtime, which is how
//! discriminator-based polymorphic payloads are validated.
//!
//! # Example
//!
//! ```
//! use objid_domain::validation::{validate, ObjectSchema, Schema};
//! use serde_json::json;
//!
//! let schema: Schema = ObjectSchema::new()
//!     .field("appId", Schema::string())
//!     .field("authKey", Schema::optional(Schema::string()))
//!     .into();
//!
//! assert!(validate(&schema, &json!({"appId": "a"})).is_ok());
//!
//! let err = validate(&schema, &json!({"appId": 7})).unwrap_err();
//! assert_eq!(
//!     err.message(),
//!     r#"Invalid property "appId", expected string but got number"#
//! );
//! ```

mod schema;

pub use schema::{ObjectSchema, Primitive, Schema, ValidatorFn, ValidatorOutcome};

use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};

/// Property name used when the whole body is validated as one value.
pub const ROOT_PATH: &str = "body";

/// Validates a request body against a schema.
///
/// Object schemas validate the body's named fields; `Array` and
/// `ArrayOrEntity` schemas validate the body as a whole. Returns the first
/// violation as [`DomainError::BadRequest`]. Does not modify the body.
pub fn validate(schema: &Schema, body: &Value) -> DomainResult<()> {
    Validator { body }.node(schema, ROOT_PATH, Some(body))
}

/// Formats the structural failure message.
pub fn mismatch_message(path: &str, expected: &str, value: Option<&Value>) -> String {
    format!(
        "Invalid property \"{path}\", expected {expected} but got {}",
        type_name(value)
    )
}

/// Runtime type name of a JSON value as reported in failure messages.
pub fn type_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

struct Validator<'a> {
    body: &'a Value,
}

impl Validator<'_> {
    fn node(&self, schema: &Schema, path: &str, value: Option<&Value>) -> DomainResult<()> {
        match schema {
            Schema::Optional(inner) => match value {
                None | Some(Value::Null) => Ok(()),
                Some(_) => self.node(inner, path, value),
            },
            Schema::Array(inner) => match value {
                Some(Value::Array(items)) => self.elements(inner, path, items),
                _ => Err(mismatch(path, "array", value)),
            },
            Schema::ArrayOrEntity(inner) => match value {
                Some(Value::Array(items)) => self.elements(inner, path, items),
                _ => self.node(inner, path, value),
            },
            Schema::Primitive(primitive) => {
                if primitive.matches(value) {
                    Ok(())
                } else {
                    Err(mismatch(path, primitive.name(), value))
                }
            }
            Schema::Object(object) => self.object(object, path, value),
            Schema::Function(f) => match (**f)(value, self.body) {
                ValidatorOutcome::Pass => Ok(()),
                ValidatorOutcome::Fail(message) => Err(DomainError::bad_request(message)),
                ValidatorOutcome::Delegate(object) => self.object(&object, path, value),
            },
        }
    }

    fn elements(&self, inner: &Schema, path: &str, items: &[Value]) -> DomainResult<()> {
        for (index, item) in items.iter().enumerate() {
            self.node(inner, &format!("{path}[{index}]"), Some(item))?;
        }
        Ok(())
    }

    /// Nested objects start a fresh pass: their fields are reported by their
    /// own names, not qualified by `path`.
    fn object(&self, object: &ObjectSchema, path: &str, value: Option<&Value>) -> DomainResult<()> {
        match value {
            Some(Value::Object(map)) => self.fields(object, map),
            _ => Err(mismatch(path, "object", value)),
        }
    }

    fn fields(&self, object: &ObjectSchema, map: &Map<String, Value>) -> DomainResult<()> {
        for (name, schema) in object.fields() {
            self.node(schema, name, map.get(name))?;
        }
        Ok(())
    }
}

fn mismatch(path: &str, expected: &str, value: Option<&Value>) -> DomainError {
    DomainError::bad_request(mismatch_message(path, expected, value))
}
