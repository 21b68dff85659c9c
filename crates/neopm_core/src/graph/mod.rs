//! Generic graph substrate: nodes, typed relationships and property bags in
//! one embedded store, plus bounded traversal and root anchors.
//!
//! # Responsibility
//! - Keep all entities in one arena addressed by stable integer ids.
//! - Offer transactional mutation and lazy read traversal.
//!
//! # Invariants
//! - Entities never own each other; edges reference nodes by id only, so
//!   hierarchies and dependency graphs may share nodes or form cycles.
//! - Node `0` is the global root; it is never deleted.

pub mod anchor;
mod error;
mod id;
mod property;
mod relationship;
mod store;
pub mod traversal;

pub use anchor::{AnchorKind, AnchorTable};
pub use error::{GraphError, GraphResult};
pub use id::{NodeId, RelationshipId, ROOT_NODE_ID};
pub use property::{PropertyBag, PropertyKey, PropertyValue};
pub use relationship::{Direction, Node, RelType, Relationship};
pub use store::{GraphRead, GraphStore, GraphTransaction};
pub use traversal::{EdgeFilter, Inclusion, Order, StopCondition, TraversalDescription, Traverser};
