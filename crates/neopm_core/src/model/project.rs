//! Project entity.
//!
//! # Responsibility
//! - Own tasks, nest sub-projects and hold allocated resources.
//!
//! # Invariants
//! - Name is never blank.
//! - A task has at most one owning project (`INCLUDE_TASK` edge).
//! - Listings are one hop; sub-project contents are not flattened except
//!   by `all_tasks_recursive`.

use crate::graph::{
    Direction, GraphRead, GraphTransaction, Inclusion, NodeId, Order, PropertyKey, PropertyValue,
    RelType, StopCondition, TraversalDescription,
};
use crate::model::wrapper::{NodeEntity, NodeWrapper, TypedNodes};
use crate::model::{
    check_name_value, ensure_name, EntityKind, ModelError, ModelResult, Resource, Task,
    TaskRelationship,
};
use log::debug;

/// Property keys of a project node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectProperty {
    Name,
}

impl PropertyKey for ProjectProperty {
    fn as_key(self) -> &'static str {
        match self {
            ProjectProperty::Name => "name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Project<'g> {
    node: NodeWrapper<'g>,
}

impl<'g> NodeEntity<'g> for Project<'g> {
    const KIND: EntityKind = EntityKind::Project;
    type Property = ProjectProperty;

    fn from_wrapper(node: NodeWrapper<'g>) -> Self {
        Self { node }
    }

    fn wrapper(&self) -> &NodeWrapper<'g> {
        &self.node
    }

    fn validate_property(key: ProjectProperty, value: Option<&PropertyValue>) -> ModelResult<()> {
        match key {
            ProjectProperty::Name => check_name_value(key, value),
        }
    }
}

impl<'g> Project<'g> {
    pub(crate) fn create_in(tx: &GraphTransaction<'g>, name: &str) -> ModelResult<Self> {
        ensure_name(name)?;
        let node = NodeWrapper::create_in(tx, EntityKind::Project)?;
        node.write_property_in(tx, ProjectProperty::Name, Some(name.into()))?;
        debug!(
            "event=entity_create module=model status=ok kind=project node_id={}",
            node.id()
        );
        Ok(Self { node })
    }

    pub fn name(&self) -> ModelResult<String> {
        self.node.required_text(ProjectProperty::Name)
    }

    pub fn set_name(&self, name: &str) -> ModelResult<()> {
        self.set_property(ProjectProperty::Name, name)
    }

    /// Creates a task owned by this project.
    pub fn create_task(&self, name: &str) -> ModelResult<Task<'g>> {
        ensure_name(name)?;
        self.node
            .store()
            .in_transaction(|tx| self.create_task_in(tx, name))
    }

    pub(crate) fn create_task_in(
        &self,
        tx: &GraphTransaction<'g>,
        name: &str,
    ) -> ModelResult<Task<'g>> {
        let task = Task::create_in(tx, name)?;
        self.node
            .create_edge_in(tx, task.id(), RelType::IncludeTask)?;
        Ok(task)
    }

    /// Creates a project nested under this one. It is not listed among the
    /// top-level projects.
    pub fn create_sub_project(&self, name: &str) -> ModelResult<Project<'g>> {
        ensure_name(name)?;
        self.node.store().in_transaction(|tx| {
            let sub_project = Project::create_in(tx, name)?;
            self.node
                .create_edge_in(tx, sub_project.id(), RelType::IncludeProject)?;
            Ok(sub_project)
        })
    }

    /// Allocates `resource` to this project. Allocations are many-to-many.
    ///
    /// # Errors
    /// - `ModelError::ForeignStore` when `resource` comes from another store
    ///   handle.
    pub fn allocate_resource(&self, resource: &Resource<'g>) -> ModelResult<TaskRelationship<'g>> {
        self.node
            .store()
            .in_transaction(|tx| self.allocate_resource_in(tx, resource))
    }

    pub(crate) fn allocate_resource_in(
        &self,
        tx: &GraphTransaction<'g>,
        resource: &Resource<'g>,
    ) -> ModelResult<TaskRelationship<'g>> {
        self.node.check_peer_in(tx, resource.wrapper())?;
        TaskRelationship::create_in(tx, self.id(), resource.id(), RelType::HoldResource)
    }

    /// Deletes task `id` together with its ownership edge, but only when
    /// this project is the owner.
    ///
    /// When another project (or none) owns the task this is a silent no-op,
    /// so `Ok(())` does not confirm a removal. Dependency and resource edges
    /// are not cascaded: a task that still has them makes the call fail
    /// with `GraphError::NodeHasRelationships` and nothing changes.
    ///
    /// # Errors
    /// - `GraphError::NodeNotFound` when the id is absent.
    pub fn remove_task_by_id(&self, id: NodeId) -> ModelResult<()> {
        self.node.store().in_transaction(|tx| {
            tx.get_node_by_id(id)?;
            match tx.single_relationship(id, RelType::IncludeTask, Direction::Incoming)? {
                Some(ownership) if ownership.start == self.id() => {
                    tx.delete_relationship(ownership.id)?;
                    tx.delete_node(id)?;
                    debug!(
                        "event=task_remove module=model status=ok project_id={} task_id={}",
                        self.id(),
                        id
                    );
                }
                _ => {
                    debug!(
                        "event=task_remove module=model status=noop project_id={} task_id={}",
                        self.id(),
                        id
                    );
                }
            }
            Ok::<(), ModelError>(())
        })
    }

    /// Drops this project's ownership edge to `task`, keeping the task.
    ///
    /// Returns `false` when this project does not own the task.
    pub fn release_task(&self, task: &Task<'g>) -> ModelResult<bool> {
        self.node.store().in_transaction(|tx| {
            self.node.check_peer_in(tx, task.wrapper())?;
            match tx.single_relationship(task.id(), RelType::IncludeTask, Direction::Incoming)? {
                Some(ownership) if ownership.start == self.id() => {
                    tx.delete_relationship(ownership.id)?;
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
    }

    /// Takes ownership of an unowned task.
    ///
    /// # Errors
    /// - `ModelError::TaskAlreadyOwned` when any project owns it already,
    ///   this one included.
    pub fn adopt_task(&self, task: &Task<'g>) -> ModelResult<()> {
        self.node.store().in_transaction(|tx| {
            self.node.check_peer_in(tx, task.wrapper())?;
            if let Some(ownership) =
                tx.single_relationship(task.id(), RelType::IncludeTask, Direction::Incoming)?
            {
                return Err(ModelError::TaskAlreadyOwned {
                    task: task.id(),
                    owner: ownership.start,
                });
            }
            self.node
                .create_edge_in(tx, task.id(), RelType::IncludeTask)?;
            Ok(())
        })
    }

    /// Direct sub-projects.
    pub fn sub_projects(&self) -> TypedNodes<'g, Project<'g>> {
        self.node
            .neighbors(RelType::IncludeProject, Direction::Outgoing)
    }

    /// Tasks owned directly by this project.
    pub fn all_tasks(&self) -> TypedNodes<'g, Task<'g>> {
        self.node.neighbors(RelType::IncludeTask, Direction::Outgoing)
    }

    /// Resources allocated to this project.
    pub fn resources(&self) -> TypedNodes<'g, Resource<'g>> {
        self.node
            .neighbors(RelType::HoldResource, Direction::Outgoing)
    }

    pub fn has_sub_projects(&self) -> ModelResult<bool> {
        self.node
            .has_edge(RelType::IncludeProject, Direction::Outgoing)
    }

    pub fn has_tasks(&self) -> ModelResult<bool> {
        self.node.has_edge(RelType::IncludeTask, Direction::Outgoing)
    }

    pub fn has_resources(&self) -> ModelResult<bool> {
        self.node
            .has_edge(RelType::HoldResource, Direction::Outgoing)
    }

    /// The project this one is nested under, `None` for top-level projects.
    pub fn parent(&self) -> ModelResult<Option<Project<'g>>> {
        self.node
            .single_edge(RelType::IncludeProject, Direction::Incoming)?
            .map(|edge| Project::load(self.node.store(), edge.start))
            .transpose()
    }

    /// Tasks of this project and of every sub-project at any depth,
    /// projects visited breadth-first.
    pub fn all_tasks_recursive(&self) -> ModelResult<Vec<Task<'g>>> {
        let description = TraversalDescription::new(
            Order::BreadthFirst,
            StopCondition::EndOfGraph,
            Inclusion::All,
        )
        .with_edge(RelType::IncludeProject, Direction::Outgoing);

        let mut tasks = Vec::new();
        for project_id in self.node.traverse_from(description) {
            let project = Project::load(self.node.store(), project_id?)?;
            for task in project.all_tasks() {
                tasks.push(task?);
            }
        }
        Ok(tasks)
    }
}
