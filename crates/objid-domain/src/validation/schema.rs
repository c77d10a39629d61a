//! Declarative request schema tree.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Primitive type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Number,
    Boolean,
    /// Any non-null JSON object.
    Object,
}

impl Primitive {
    pub fn name(self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
            Primitive::Object => "object",
        }
    }

    pub fn matches(self, value: Option<&Value>) -> bool {
        matches!(
            (self, value),
            (Primitive::String, Some(Value::String(_)))
                | (Primitive::Number, Some(Value::Number(_)))
                | (Primitive::Boolean, Some(Value::Bool(_)))
                | (Primitive::Object, Some(Value::Object(_)))
        )
    }
}

/// Result of a function validator.
#[derive(Debug, Clone)]
pub enum ValidatorOutcome {
    Pass,
    /// Fails with this exact message.
    Fail(String),
    /// Validates the value against a dynamically chosen schema.
    Delegate(ObjectSchema),
}

/// Signature of a function validator: `(value, whole request body)`.
///
/// `value` is `None` when the property is absent.
pub type ValidatorFn = dyn Fn(Option<&Value>, &Value) -> ValidatorOutcome + Send + Sync;

/// Named fields validated in declaration order. Every field is required
/// unless wrapped in [`Schema::Optional`].
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    fields: Vec<(String, Schema)>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.fields.push((name.into(), schema.into()));
        self
    }

    pub fn fields(&self) -> &[(String, Schema)] {
        &self.fields
    }
}

/// A node of the validation schema.
#[derive(Clone)]
pub enum Schema {
    Primitive(Primitive),
    Object(ObjectSchema),
    /// Skipped when the value is absent or null.
    Optional(Box<Schema>),
    /// Value must be an array; the inner schema applies to every element.
    Array(Box<Schema>),
    /// Inner schema applies to the value, or to every element if it is an array.
    ArrayOrEntity(Box<Schema>),
    Function(Arc<ValidatorFn>),
}

impl Schema {
    pub fn string() -> Self {
        Schema::Primitive(Primitive::String)
    }

    pub fn number() -> Self {
        Schema::Primitive(Primitive::Number)
    }

    pub fn boolean() -> Self {
        Schema::Primitive(Primitive::Boolean)
    }

    pub fn object() -> Self {
        Schema::Primitive(Primitive::Object)
    }

    pub fn optional(inner: impl Into<Schema>) -> Self {
        Schema::Optional(Box::new(inner.into()))
    }

    pub fn array(inner: impl Into<Schema>) -> Self {
        Schema::Array(Box::new(inner.into()))
    }

    pub fn array_or_entity(inner: impl Into<Schema>) -> Self {
        Schema::ArrayOrEntity(Box::new(inner.into()))
    }

    pub fn function<F>(f: F) -> Self
    where
        F: Fn(Option<&Value>, &Value) -> ValidatorOutcome + Send + Sync + 'static,
    {
        Schema::Function(Arc::new(f))
    }
}

impl From<ObjectSchema> for Schema {
    fn from(schema: ObjectSchema) -> Self {
        Schema::Object(schema)
    }
}

impl From<Primitive> for Schema {
    fn from(primitive: Primitive) -> Self {
        Schema::Primitive(primitive)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Primitive(p) => write!(f, "{}", p.name()),
            Schema::Object(o) => f
                .debug_map()
                .entries(o.fields.iter().map(|(k, v)| (k, v)))
                .finish(),
            Schema::Optional(inner) => f.debug_tuple("Optional").field(inner).finish(),
            Schema::Array(inner) => f.debug_tuple("Array").field(inner).finish(),
            Schema::ArrayOrEntity(inner) => f.debug_tuple("ArrayOrEntity").field(inner).finish(),
            Schema::Function(_) => f.write_str("Function"),
        }
    }
}
