//! Relationship types, directions and read snapshots.
//!
//! # Invariants
//! - Relationship types form a closed enumeration; the stored text is the
//!   `SCREAMING_SNAKE_CASE` name and never changes once written.
//! - A relationship always connects exactly two nodes, `start -> end`.

use crate::graph::{NodeId, PropertyBag, RelationshipId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Every edge type known to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelType {
    /// Root -> project anchor.
    MetaProject,
    /// Root -> resource anchor.
    MetaResource,
    /// Project anchor -> top-level project.
    IsAProject,
    /// Resource anchor -> resource.
    IsAResource,
    /// Project -> sub-project.
    IncludeProject,
    /// Project -> owned task.
    IncludeTask,
    /// Project -> allocated resource.
    HoldResource,
    /// Prerequisite task -> task that depends on it.
    DependOn,
    /// Task -> resource it uses.
    UseResource,
}

impl RelType {
    pub const ALL: [RelType; 9] = [
        RelType::MetaProject,
        RelType::MetaResource,
        RelType::IsAProject,
        RelType::IsAResource,
        RelType::IncludeProject,
        RelType::IncludeTask,
        RelType::HoldResource,
        RelType::DependOn,
        RelType::UseResource,
    ];

    pub fn as_db_str(self) -> &'static str {
        match self {
            RelType::MetaProject => "META_PROJECT",
            RelType::MetaResource => "META_RESOURCE",
            RelType::IsAProject => "IS_A_PROJECT",
            RelType::IsAResource => "IS_A_RESOURCE",
            RelType::IncludeProject => "INCLUDE_PROJECT",
            RelType::IncludeTask => "INCLUDE_TASK",
            RelType::HoldResource => "HOLD_RESOURCE",
            RelType::DependOn => "DEPEND_ON",
            RelType::UseResource => "USE_RESOURCE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|rel_type| rel_type.as_db_str() == value)
    }
}

impl Display for RelType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db_str())
    }
}

/// Which edges of a node to follow, seen from that node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Edges starting at the node.
    Outgoing,
    /// Edges ending at the node.
    Incoming,
    /// Either of the above.
    Both,
}

impl Direction {
    pub fn includes_outgoing(self) -> bool {
        matches!(self, Direction::Outgoing | Direction::Both)
    }

    pub fn includes_incoming(self) -> bool {
        matches!(self, Direction::Incoming | Direction::Both)
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Outgoing => f.write_str("outgoing"),
            Direction::Incoming => f.write_str("incoming"),
            Direction::Both => f.write_str("both"),
        }
    }
}

/// Read snapshot of one relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelationshipId,
    pub rel_type: RelType,
    pub start: NodeId,
    pub end: NodeId,
}

impl Relationship {
    /// Returns the endpoint opposite to `node`, or `None` when `node` is not
    /// an endpoint of this relationship.
    pub fn other_node(&self, node: NodeId) -> Option<NodeId> {
        if node == self.start {
            Some(self.end)
        } else if node == self.end {
            Some(self.start)
        } else {
            None
        }
    }
}

/// Read snapshot of one node and its property bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub properties: PropertyBag,
}

#[cfg(test)]
mod tests {
    use super::{Direction, RelType, Relationship};
    use crate::graph::{NodeId, RelationshipId};

    #[test]
    fn rel_type_db_names_parse_back() {
        for rel_type in RelType::ALL {
            assert_eq!(RelType::parse(rel_type.as_db_str()), Some(rel_type));
        }
        assert_eq!(RelType::parse("KNOWS"), None);
    }

    #[test]
    fn both_direction_includes_each_side() {
        assert!(Direction::Both.includes_outgoing());
        assert!(Direction::Both.includes_incoming());
        assert!(!Direction::Outgoing.includes_incoming());
        assert!(!Direction::Incoming.includes_outgoing());
    }

    #[test]
    fn other_node_returns_opposite_endpoint() {
        let rel = Relationship {
            id: RelationshipId::new(7),
            rel_type: RelType::DependOn,
            start: NodeId::new(1),
            end: NodeId::new(2),
        };
        assert_eq!(rel.other_node(NodeId::new(1)), Some(NodeId::new(2)));
        assert_eq!(rel.other_node(NodeId::new(2)), Some(NodeId::new(1)));
        assert_eq!(rel.other_node(NodeId::new(3)), None);
    }
}
