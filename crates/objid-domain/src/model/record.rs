//! Persisted app record.
//!
//! Records are owned by storage and may carry properties this service does
//! not interpret. Those are kept in `extra` maps so that a record written
//! back after an upgrade loses nothing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Authorization settings of an app.
///
/// A non-empty `key` is the only gate; `user` is informational.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthorizationDescriptor {
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }
}

/// An inclusive range of permitted ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRange {
    pub from: u64,
    pub to: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Consumption and authorization state of one app.
///
/// Serialized as a flat JSON object: one array per object type plus the
/// reserved `_authorization`, `_ranges` and `_upgrade` properties. Any other
/// property (underscore-prefixed, or not an array of ids) lands in `extra`
/// and is written back as found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredRecord", into = "StoredRecord")]
pub struct AppRecord {
    pub authorization: Option<AuthorizationDescriptor>,
    pub ranges: Option<Vec<IdRange>>,
    /// Upgrade steps already applied to this record.
    pub upgrade: Option<Vec<String>>,
    /// Object type tag → consumed ids, in consumption order.
    pub consumption: BTreeMap<String, Vec<u64>>,
    pub extra: Map<String, Value>,
}

/// Wire shape of [`AppRecord`].
#[derive(Serialize, Deserialize)]
struct StoredRecord {
    #[serde(
        rename = "_authorization",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    authorization: Option<AuthorizationDescriptor>,
    #[serde(rename = "_ranges", default, skip_serializing_if = "Option::is_none")]
    ranges: Option<Vec<IdRange>>,
    #[serde(rename = "_upgrade", default, skip_serializing_if = "Option::is_none")]
    upgrade: Option<Vec<String>>,
    #[serde(flatten)]
    properties: Map<String, Value>,
}

fn id_array(value: &Value) -> Option<Vec<u64>> {
    value.as_array()?.iter().map(Value::as_u64).collect()
}

impl From<StoredRecord> for AppRecord {
    fn from(stored: StoredRecord) -> Self {
        let mut consumption = BTreeMap::new();
        let mut extra = Map::new();
        for (name, value) in stored.properties {
            match id_array(&value).filter(|_| !name.starts_with('_')) {
                Some(ids) => {
                    consumption.insert(name, ids);
                }
                None => {
                    extra.insert(name, value);
                }
            }
        }

        Self {
            authorization: stored.authorization,
            ranges: stored.ranges,
            upgrade: stored.upgrade,
            consumption,
            extra,
        }
    }
}

impl From<AppRecord> for StoredRecord {
    fn from(record: AppRecord) -> Self {
        let mut properties = record.extra;
        for (name, ids) in record.consumption {
            properties.insert(name, Value::from(ids));
        }

        Self {
            authorization: record.authorization,
            ranges: record.ranges,
            upgrade: record.upgrade,
            properties,
        }
    }
}

impl AppRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds consumed ids for an object type.
    pub fn with_consumption(mut self, object_type: impl Into<String>, ids: Vec<u64>) -> Self {
        self.consumption.insert(object_type.into(), ids);
        self
    }

    pub fn with_authorization(mut self, authorization: AuthorizationDescriptor) -> Self {
        self.authorization = Some(authorization);
        self
    }

    /// The configured key, if the app is protected.
    ///
    /// Returns `None` when there is no descriptor or its key is absent or empty.
    pub fn authorization_key(&self) -> Option<&str> {
        self.authorization
            .as_ref()
            .and_then(|a| a.key.as_deref())
            .filter(|k| !k.is_empty())
    }

    pub fn is_protected(&self) -> bool {
        self.authorization_key().is_some()
    }

    pub fn has_upgrade(&self, tag: &str) -> bool {
        self.upgrade
            .as_ref()
            .is_some_and(|tags| tags.iter().any(|t| t == tag))
    }

    /// Standard (non-extended) object types and their ids.
    pub fn standard_consumption(&self) -> impl Iterator<Item = (&str, &[u64])> {
        self.consumption
            .iter()
            .filter(|(name, _)| !name.starts_with('_') && !is_extended_type(name))
            .map(|(name, ids)| (name.as_str(), ids.as_slice()))
    }

    /// Total number of consumed ids across standard object types.
    pub fn standard_total(&self) -> usize {
        self.standard_consumption().map(|(_, ids)| ids.len()).sum()
    }

    /// Copy of this record with the authorization descriptor removed.
    pub fn without_authorization(&self) -> Self {
        Self {
            authorization: None,
            ..self.clone()
        }
    }
}

/// Whether an object type name carries a numeric suffix, e.g. `table_2`.
///
/// Extended types track sub-object ids (fields, enum values) of a parent
/// object and are excluded from consumption totals.
pub fn is_extended_type(name: &str) -> bool {
    match name.rsplit_once('_') {
        Some((prefix, suffix)) => {
            !prefix.is_empty() && !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}
