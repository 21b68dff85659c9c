//! Task entity.
//!
//! # Invariants
//! - Name is never blank.
//! - Duration, when present, is at least zero minutes.
//! - A `DEPEND_ON` edge points from the prerequisite to the task that
//!   depends on it: `b.add_dependent_on(a)` and `a.add_dependent(b)` both
//!   create `a -> b`. `dependent_tasks` follows outgoing edges and
//!   `dependencies` follows incoming ones.

use crate::graph::{
    Direction, GraphError, GraphTransaction, PropertyKey, PropertyValue, RelType,
};
use crate::model::wrapper::{NodeEntity, NodeWrapper, TypedNodes};
use crate::model::{
    check_name_value, check_value_type, ensure_name, EntityKind, ModelError, ModelResult,
    Project, Resource, TaskRelationship,
};
use chrono::{DateTime, TimeDelta, Utc};
use log::debug;

/// Property keys of a task node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskProperty {
    Name,
    CreatedOn,
    StartDate,
    DurationInMinutes,
    /// Minor currency units.
    Cost,
}

impl PropertyKey for TaskProperty {
    fn as_key(self) -> &'static str {
        match self {
            TaskProperty::Name => "name",
            TaskProperty::CreatedOn => "created_on",
            TaskProperty::StartDate => "start_date",
            TaskProperty::DurationInMinutes => "duration_in_minutes",
            TaskProperty::Cost => "cost",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Task<'g> {
    node: NodeWrapper<'g>,
}

impl<'g> NodeEntity<'g> for Task<'g> {
    const KIND: EntityKind = EntityKind::Task;
    type Property = TaskProperty;

    fn from_wrapper(node: NodeWrapper<'g>) -> Self {
        Self { node }
    }

    fn wrapper(&self) -> &NodeWrapper<'g> {
        &self.node
    }

    fn validate_property(key: TaskProperty, value: Option<&PropertyValue>) -> ModelResult<()> {
        match key {
            TaskProperty::Name => check_name_value(key, value),
            TaskProperty::CreatedOn => match value {
                None => Err(ModelError::RequiredProperty(key.as_key())),
                Some(_) => check_value_type(key, value, "timestamp"),
            },
            TaskProperty::StartDate => check_value_type(key, value, "timestamp"),
            TaskProperty::DurationInMinutes => {
                check_value_type(key, value, "integer")?;
                ensure_duration(value.and_then(PropertyValue::as_integer))
            }
            TaskProperty::Cost => check_value_type(key, value, "integer"),
        }
    }
}

impl<'g> Task<'g> {
    pub(crate) fn create_in(tx: &GraphTransaction<'g>, name: &str) -> ModelResult<Self> {
        ensure_name(name)?;
        let node = NodeWrapper::create_in(tx, EntityKind::Task)?;
        node.write_property_in(tx, TaskProperty::Name, Some(name.into()))?;
        node.write_property_in(
            tx,
            TaskProperty::CreatedOn,
            Some(PropertyValue::Timestamp(Utc::now().timestamp_millis())),
        )?;
        debug!(
            "event=entity_create module=model status=ok kind=task node_id={}",
            node.id()
        );
        Ok(Self { node })
    }

    pub fn name(&self) -> ModelResult<String> {
        self.node.required_text(TaskProperty::Name)
    }

    pub fn set_name(&self, name: &str) -> ModelResult<()> {
        self.set_property(TaskProperty::Name, name)
    }

    pub fn created_on(&self) -> ModelResult<DateTime<Utc>> {
        self.node
            .timestamp_property(TaskProperty::CreatedOn)?
            .ok_or_else(|| {
                ModelError::from(GraphError::InvalidData(format!(
                    "task node {} is missing `created_on`",
                    self.id()
                )))
            })
    }

    pub fn start_date(&self) -> ModelResult<Option<DateTime<Utc>>> {
        self.node.timestamp_property(TaskProperty::StartDate)
    }

    /// Sets or clears the start date.
    pub fn set_start_date(&self, start: Option<DateTime<Utc>>) -> ModelResult<()> {
        self.set_or_remove_property(
            TaskProperty::StartDate,
            start.map(|value| PropertyValue::Timestamp(value.timestamp_millis())),
        )
    }

    pub fn duration_in_minutes(&self) -> ModelResult<Option<i64>> {
        self.node.integer_property(TaskProperty::DurationInMinutes)
    }

    /// Sets or clears the duration.
    ///
    /// # Errors
    /// - `ModelError::NegativeDuration`; the stored duration is unchanged.
    pub fn set_duration(&self, minutes: Option<i64>) -> ModelResult<()> {
        self.set_or_remove_property(
            TaskProperty::DurationInMinutes,
            minutes.map(PropertyValue::Integer),
        )
    }

    pub(crate) fn set_duration_in(
        &self,
        tx: &GraphTransaction<'_>,
        minutes: Option<i64>,
    ) -> ModelResult<()> {
        ensure_duration(minutes)?;
        self.node.write_property_in(
            tx,
            TaskProperty::DurationInMinutes,
            minutes.map(PropertyValue::Integer),
        )
    }

    pub fn cost(&self) -> ModelResult<Option<i64>> {
        self.node.integer_property(TaskProperty::Cost)
    }

    pub fn set_cost(&self, cost: Option<i64>) -> ModelResult<()> {
        self.set_or_remove_property(TaskProperty::Cost, cost.map(PropertyValue::Integer))
    }

    /// Start date plus duration, an absent duration counting as zero.
    /// `None` while the start date is unset.
    pub fn end_date(&self) -> ModelResult<Option<DateTime<Utc>>> {
        let Some(start) = self.start_date()? else {
            return Ok(None);
        };
        let minutes = self.duration_in_minutes()?.unwrap_or(0);
        let end = TimeDelta::try_minutes(minutes)
            .and_then(|duration| start.checked_add_signed(duration))
            .ok_or_else(|| {
                ModelError::from(GraphError::InvalidData(format!(
                    "end date of task {} overflows ({minutes} minutes after {start})",
                    self.id()
                )))
            })?;
        Ok(Some(end))
    }

    /// Records that this task depends on `other`: creates `other -> self`.
    ///
    /// # Errors
    /// - `ModelError::ForeignStore` when `other` comes from another store
    ///   handle; nothing is linked.
    pub fn add_dependent_on(&self, other: &Task<'g>) -> ModelResult<TaskRelationship<'g>> {
        self.node
            .store()
            .in_transaction(|tx| self.add_dependent_on_in(tx, other))
    }

    pub(crate) fn add_dependent_on_in(
        &self,
        tx: &GraphTransaction<'g>,
        other: &Task<'g>,
    ) -> ModelResult<TaskRelationship<'g>> {
        self.node.check_peer_in(tx, other.wrapper())?;
        TaskRelationship::create_in(tx, other.id(), self.id(), RelType::DependOn)
    }

    /// Records that `other` depends on this task: creates `self -> other`.
    pub fn add_dependent(&self, other: &Task<'g>) -> ModelResult<TaskRelationship<'g>> {
        self.node.store().in_transaction(|tx| {
            self.node.check_peer_in(tx, other.wrapper())?;
            TaskRelationship::create_in(tx, self.id(), other.id(), RelType::DependOn)
        })
    }

    /// Tasks that depend on this one (outgoing `DEPEND_ON`).
    pub fn dependent_tasks(&self) -> TypedNodes<'g, Task<'g>> {
        self.node.neighbors(RelType::DependOn, Direction::Outgoing)
    }

    /// Tasks this one depends on (incoming `DEPEND_ON`).
    pub fn dependencies(&self) -> TypedNodes<'g, Task<'g>> {
        self.node.neighbors(RelType::DependOn, Direction::Incoming)
    }

    pub fn has_dependents(&self) -> ModelResult<bool> {
        self.node.has_edge(RelType::DependOn, Direction::Outgoing)
    }

    pub fn has_dependencies(&self) -> ModelResult<bool> {
        self.node.has_edge(RelType::DependOn, Direction::Incoming)
    }

    pub fn use_resource(&self, resource: &Resource<'g>) -> ModelResult<TaskRelationship<'g>> {
        self.node
            .store()
            .in_transaction(|tx| self.use_resource_in(tx, resource))
    }

    pub(crate) fn use_resource_in(
        &self,
        tx: &GraphTransaction<'g>,
        resource: &Resource<'g>,
    ) -> ModelResult<TaskRelationship<'g>> {
        self.node.check_peer_in(tx, resource.wrapper())?;
        TaskRelationship::create_in(tx, self.id(), resource.id(), RelType::UseResource)
    }

    pub fn resources(&self) -> TypedNodes<'g, Resource<'g>> {
        self.node
            .neighbors(RelType::UseResource, Direction::Outgoing)
    }

    /// The owning project, `None` while the task is unowned.
    pub fn project(&self) -> ModelResult<Option<Project<'g>>> {
        self.node
            .single_edge(RelType::IncludeTask, Direction::Incoming)?
            .map(|edge| Project::load(self.node.store(), edge.start))
            .transpose()
    }
}

fn ensure_duration(minutes: Option<i64>) -> ModelResult<()> {
    match minutes {
        Some(value) if value < 0 => Err(ModelError::NegativeDuration(value)),
        _ => Ok(()),
    }
}
