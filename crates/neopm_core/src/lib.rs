//! Project-management domain stored in an embedded property graph.
//!
//! Layers, bottom up: `db` opens and migrates SQLite, `graph` is the
//! generic node/relationship store with traversal and root anchors,
//! `model` wraps nodes as projects, tasks and resources, and `manager`
//! ties one open store to its anchors.

pub mod db;
pub mod graph;
pub mod logging;
pub mod manager;
pub mod model;

pub use db::{DbError, DbResult, StoreOptions};
pub use graph::{
    Direction, GraphError, GraphRead, GraphResult, GraphStore, GraphTransaction, NodeId,
    PropertyValue, RelType, RelationshipId, TraversalDescription,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use manager::StoreManager;
pub use model::{
    EdgeProperty, EntityKind, ModelError, ModelResult, NodeEntity, Project, ProjectProperty,
    Resource, ResourceProperty, Task, TaskProperty, TaskRelationship,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
