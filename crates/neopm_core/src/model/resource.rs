//! Resource entity: a named thing projects hold and tasks use.

use crate::graph::{Direction, GraphTransaction, PropertyKey, PropertyValue, RelType};
use crate::model::wrapper::{NodeEntity, NodeWrapper, TypedNodes};
use crate::model::{check_name_value, ensure_name, EntityKind, ModelResult, Project, Task};
use log::debug;

/// Property keys of a resource node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceProperty {
    Name,
}

impl PropertyKey for ResourceProperty {
    fn as_key(self) -> &'static str {
        match self {
            ResourceProperty::Name => "name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource<'g> {
    node: NodeWrapper<'g>,
}

impl<'g> NodeEntity<'g> for Resource<'g> {
    const KIND: EntityKind = EntityKind::Resource;
    type Property = ResourceProperty;

    fn from_wrapper(node: NodeWrapper<'g>) -> Self {
        Self { node }
    }

    fn wrapper(&self) -> &NodeWrapper<'g> {
        &self.node
    }

    fn validate_property(key: ResourceProperty, value: Option<&PropertyValue>) -> ModelResult<()> {
        match key {
            ResourceProperty::Name => check_name_value(key, value),
        }
    }
}

impl<'g> Resource<'g> {
    pub(crate) fn create_in(tx: &GraphTransaction<'g>, name: &str) -> ModelResult<Self> {
        ensure_name(name)?;
        let node = NodeWrapper::create_in(tx, EntityKind::Resource)?;
        node.write_property_in(tx, ResourceProperty::Name, Some(name.into()))?;
        debug!(
            "event=entity_create module=model status=ok kind=resource node_id={}",
            node.id()
        );
        Ok(Self { node })
    }

    pub fn name(&self) -> ModelResult<String> {
        self.node.required_text(ResourceProperty::Name)
    }

    pub fn set_name(&self, name: &str) -> ModelResult<()> {
        self.set_property(ResourceProperty::Name, name)
    }

    /// Projects this resource is allocated to.
    pub fn projects(&self) -> TypedNodes<'g, Project<'g>> {
        self.node
            .neighbors(RelType::HoldResource, Direction::Incoming)
    }

    /// Tasks using this resource.
    pub fn tasks(&self) -> TypedNodes<'g, Task<'g>> {
        self.node
            .neighbors(RelType::UseResource, Direction::Incoming)
    }
}
