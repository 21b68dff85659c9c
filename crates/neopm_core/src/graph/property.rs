//! Typed property bags attached to nodes and relationships.
//!
//! # Invariants
//! - Keys come from closed per-entity enumerations (`PropertyKey`), never
//!   from callers as free text.
//! - An absent key means "no value"; there is no stored null.
//! - Each stored value keeps its primitive kind (`text`, `integer`,
//!   `timestamp`) so reads can reject mismatched data.

use crate::graph::{GraphError, GraphResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A property key enumeration.
///
/// Implemented by the per-entity key enums in the model layer.
pub trait PropertyKey: Copy {
    /// The key as stored in the property tables.
    fn as_key(self) -> &'static str;
}

/// One stored property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
    /// Unix epoch milliseconds.
    Timestamp(i64),
}

impl PropertyValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<i64> {
        match self {
            PropertyValue::Timestamp(value) => Some(*value),
            _ => None,
        }
    }

    pub(crate) fn value_type(&self) -> &'static str {
        match self {
            PropertyValue::Text(_) => "text",
            PropertyValue::Integer(_) => "integer",
            PropertyValue::Timestamp(_) => "timestamp",
        }
    }

    /// Splits into the `(text_value, int_value)` column pair.
    pub(crate) fn to_columns(&self) -> (Option<&str>, Option<i64>) {
        match self {
            PropertyValue::Text(value) => (Some(value.as_str()), None),
            PropertyValue::Integer(value) | PropertyValue::Timestamp(value) => (None, Some(*value)),
        }
    }

    /// Rebuilds a value from its stored columns.
    pub(crate) fn from_columns(
        key: &str,
        value_type: &str,
        text_value: Option<String>,
        int_value: Option<i64>,
    ) -> GraphResult<Self> {
        match (value_type, text_value, int_value) {
            ("text", Some(text), None) => Ok(PropertyValue::Text(text)),
            ("integer", None, Some(value)) => Ok(PropertyValue::Integer(value)),
            ("timestamp", None, Some(value)) => Ok(PropertyValue::Timestamp(value)),
            (other, _, _) => Err(GraphError::InvalidData(format!(
                "property `{key}` has inconsistent columns for value type `{other}`"
            ))),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

/// All properties of one node or relationship, ordered by key.
pub type PropertyBag = BTreeMap<String, PropertyValue>;
