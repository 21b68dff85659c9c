//! Typed wrapper over one dependency or allocation edge.
//!
//! Owns no node; only the edge and its property bag.

use crate::graph::{
    GraphRead, GraphStore, GraphTransaction, NodeId, PropertyBag, PropertyKey, PropertyValue,
    RelType, Relationship, RelationshipId,
};
use crate::model::{check_value_type, ModelError, ModelResult};
use std::fmt::{Debug, Formatter};

/// Property keys of a dependency or allocation edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeProperty {
    /// Minutes to wait after the prerequisite ends (dependencies).
    LagInMinutes,
    /// Allocated share in percent (allocations).
    Units,
}

impl PropertyKey for EdgeProperty {
    fn as_key(self) -> &'static str {
        match self {
            EdgeProperty::LagInMinutes => "lag_in_minutes",
            EdgeProperty::Units => "units",
        }
    }
}

#[derive(Clone, Copy)]
pub struct TaskRelationship<'g> {
    store: &'g GraphStore,
    id: RelationshipId,
    rel_type: RelType,
    start: NodeId,
    end: NodeId,
}

impl Debug for TaskRelationship<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRelationship")
            .field("id", &self.id)
            .field("rel_type", &self.rel_type)
            .field("start", &self.start)
            .field("end", &self.end)
            .finish()
    }
}

impl<'g> TaskRelationship<'g> {
    /// Edge types this wrapper accepts.
    pub const WRAPPED_TYPES: [RelType; 3] = [
        RelType::DependOn,
        RelType::UseResource,
        RelType::HoldResource,
    ];

    pub(crate) fn create_in(
        tx: &GraphTransaction<'g>,
        start: NodeId,
        end: NodeId,
        rel_type: RelType,
    ) -> ModelResult<Self> {
        let id = tx.create_relationship(start, end, rel_type)?;
        Ok(Self {
            store: tx.store(),
            id,
            rel_type,
            start,
            end,
        })
    }

    /// Wraps an existing dependency or allocation edge.
    ///
    /// # Errors
    /// - `GraphError::RelationshipNotFound` when the id is absent.
    /// - `ModelError::UnexpectedRelationshipType` for any other edge type.
    pub fn load(store: &'g GraphStore, id: RelationshipId) -> ModelResult<Self> {
        let Relationship {
            id,
            rel_type,
            start,
            end,
        } = store.get_relationship_by_id(id)?;
        if !Self::WRAPPED_TYPES.contains(&rel_type) {
            return Err(ModelError::UnexpectedRelationshipType {
                relationship: id,
                rel_type,
            });
        }
        Ok(Self {
            store,
            id,
            rel_type,
            start,
            end,
        })
    }

    pub fn id(&self) -> RelationshipId {
        self.id
    }

    pub fn rel_type(&self) -> RelType {
        self.rel_type
    }

    pub fn start_node(&self) -> NodeId {
        self.start
    }

    pub fn end_node(&self) -> NodeId {
        self.end
    }

    pub fn property(&self, key: EdgeProperty) -> ModelResult<Option<PropertyValue>> {
        Ok(self.store.relationship_property(self.id, key)?)
    }

    pub fn properties(&self) -> ModelResult<PropertyBag> {
        Ok(self.store.relationship_properties(self.id)?)
    }

    pub fn set_property(&self, key: EdgeProperty, value: impl Into<PropertyValue>) -> ModelResult<()> {
        self.set_or_remove_property(key, Some(value.into()))
    }

    /// Stores `value`, or removes the key when `value` is `None`.
    ///
    /// # Errors
    /// - `ModelError::PropertyType` unless `value` is an integer.
    pub fn set_or_remove_property(
        &self,
        key: EdgeProperty,
        value: Option<PropertyValue>,
    ) -> ModelResult<()> {
        check_value_type(key, value.as_ref(), "integer")?;
        self.store.in_transaction(|tx| {
            match value {
                Some(value) => tx.set_relationship_property(self.id, key, &value)?,
                None => {
                    tx.remove_relationship_property(self.id, key)?;
                }
            }
            Ok(())
        })
    }

    pub fn remove_property(&self, key: EdgeProperty) -> ModelResult<bool> {
        self.store
            .in_transaction(|tx| Ok(tx.remove_relationship_property(self.id, key)?))
    }
}
