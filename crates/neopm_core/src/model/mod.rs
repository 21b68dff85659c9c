//! Domain model persisted as graph nodes.
//!
//! # Responsibility
//! - Map graph nodes to Project/Task/Resource entities with a checked
//!   type discriminant.
//! - Keep domain invariants (non-blank names, non-negative durations,
//!   single task ownership) above the graph store.
//!
//! # Invariants
//! - Every mutating entity call runs in exactly one transaction scope.
//! - Entities reference each other by node id only.

mod error;
mod kind;
mod project;
mod resource;
mod task;
mod task_relationship;
mod wrapper;

pub use error::{ModelError, ModelResult};
pub use kind::EntityKind;
pub use project::{Project, ProjectProperty};
pub use resource::{Resource, ResourceProperty};
pub use task::{Task, TaskProperty};
pub use task_relationship::{EdgeProperty, TaskRelationship};
pub use wrapper::{NodeEntity, NodeWrapper, TypedNodes};

use crate::graph::{PropertyKey, PropertyValue};

/// Rejects names that are empty or whitespace only.
pub(crate) fn ensure_name(name: &str) -> ModelResult<()> {
    if name.trim().is_empty() {
        return Err(ModelError::BlankName);
    }
    Ok(())
}

/// Validates a write to a required name key; `None` is a removal.
pub(crate) fn check_name_value<K: PropertyKey>(
    key: K,
    value: Option<&PropertyValue>,
) -> ModelResult<()> {
    match value {
        None => Err(ModelError::RequiredProperty(key.as_key())),
        Some(PropertyValue::Text(name)) => ensure_name(name),
        Some(other) => Err(ModelError::PropertyType {
            key: key.as_key(),
            expected: "text",
            found: other.value_type(),
        }),
    }
}

/// Accepts removals and values whose type is `expected`.
pub(crate) fn check_value_type<K: PropertyKey>(
    key: K,
    value: Option<&PropertyValue>,
    expected: &'static str,
) -> ModelResult<()> {
    match value {
        Some(value) if value.value_type() != expected => Err(ModelError::PropertyType {
            key: key.as_key(),
            expected,
            found: value.value_type(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::{check_name_value, check_value_type, ensure_name, ModelError};
    use crate::graph::PropertyValue;
    use crate::model::TaskProperty;

    #[test]
    fn ensure_name_rejects_whitespace_only() {
        assert!(matches!(ensure_name(""), Err(ModelError::BlankName)));
        assert!(matches!(ensure_name(" \t\n"), Err(ModelError::BlankName)));
        assert!(ensure_name(" Launch ").is_ok());
    }

    #[test]
    fn name_values_must_be_present_non_blank_text() {
        let blank = PropertyValue::Text("  ".to_string());
        let number = PropertyValue::Integer(3);
        assert!(matches!(
            check_name_value(TaskProperty::Name, None),
            Err(ModelError::RequiredProperty("name"))
        ));
        assert!(matches!(
            check_name_value(TaskProperty::Name, Some(&blank)),
            Err(ModelError::BlankName)
        ));
        assert!(matches!(
            check_name_value(TaskProperty::Name, Some(&number)),
            Err(ModelError::PropertyType { expected: "text", found: "integer", .. })
        ));
    }

    #[test]
    fn value_types_allow_removal() {
        let text = PropertyValue::Text("soon".to_string());
        assert!(check_value_type(TaskProperty::StartDate, None, "timestamp").is_ok());
        assert!(check_value_type(TaskProperty::StartDate, Some(&text), "timestamp").is_err());
    }
}
