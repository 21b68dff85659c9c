use crate::db::DbError;
use crate::graph::{Direction, NodeId, RelType, RelationshipId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by graph store operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors from graph store and traversal operations.
#[derive(Debug)]
pub enum GraphError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// No node with this id exists in the store.
    NodeNotFound(NodeId),
    /// No relationship with this id exists in the store.
    RelationshipNotFound(RelationshipId),
    /// The global root node is never deleted.
    RootNodeProtected,
    /// Node deletion refused because edges still reference it.
    NodeHasRelationships { node: NodeId, count: u64 },
    /// A single relationship was expected but several matched.
    MultipleRelationships {
        node: NodeId,
        rel_type: RelType,
        direction: Direction,
        count: usize,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for GraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NodeNotFound(id) => write!(f, "node not found: {id}"),
            Self::RelationshipNotFound(id) => write!(f, "relationship not found: {id}"),
            Self::RootNodeProtected => write!(f, "the global root node cannot be deleted"),
            Self::NodeHasRelationships { node, count } => write!(
                f,
                "node {node} still has {count} relationship(s) and cannot be deleted"
            ),
            Self::MultipleRelationships {
                node,
                rel_type,
                direction,
                count,
            } => write!(
                f,
                "expected at most one {direction} {rel_type} relationship on node {node}, found {count}"
            ),
            Self::InvalidData(message) => write!(f, "invalid graph data: {message}"),
        }
    }
}

impl Error for GraphError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NodeNotFound(_)
            | Self::RelationshipNotFound(_)
            | Self::RootNodeProtected
            | Self::NodeHasRelationships { .. }
            | Self::MultipleRelationships { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for GraphError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for GraphError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
