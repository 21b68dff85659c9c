use crate::graph::{GraphError, NodeId, RelType, RelationshipId};
use crate::model::EntityKind;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by domain entity operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors from domain entity operations.
#[derive(Debug)]
pub enum ModelError {
    /// Name is blank after trim.
    BlankName,
    /// Task duration below zero minutes.
    NegativeDuration(i64),
    /// Task already belongs to a project.
    TaskAlreadyOwned { task: NodeId, owner: NodeId },
    /// Removal of a property every entity of the kind must carry.
    RequiredProperty(&'static str),
    /// Value of the wrong primitive type for the key.
    PropertyType {
        key: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    /// Key managed by the model itself, such as the entity discriminant.
    ReservedProperty(&'static str),
    /// Wrapper borrowed from another store handle.
    ForeignStore(NodeId),
    /// Stored discriminant differs from the requested entity kind.
    TypeMismatch {
        node: NodeId,
        expected: EntityKind,
        found: Option<EntityKind>,
    },
    /// Relationship exists but is not a dependency/allocation edge.
    UnexpectedRelationshipType {
        relationship: RelationshipId,
        rel_type: RelType,
    },
    /// Graph store failure, including not-found lookups.
    Graph(GraphError),
}

impl ModelError {
    /// Whether the caller passed a value the model rejects.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::BlankName
                | Self::NegativeDuration(_)
                | Self::TaskAlreadyOwned { .. }
                | Self::RequiredProperty(_)
                | Self::PropertyType { .. }
                | Self::ReservedProperty(_)
                | Self::ForeignStore(_)
        )
    }

    /// Whether a node or relationship id was absent from the store.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Graph(GraphError::NodeNotFound(_) | GraphError::RelationshipNotFound(_))
        )
    }
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "name must not be blank"),
            Self::NegativeDuration(minutes) => {
                write!(f, "duration must not be negative, got {minutes} minutes")
            }
            Self::TaskAlreadyOwned { task, owner } => {
                write!(f, "task {task} already belongs to project {owner}")
            }
            Self::RequiredProperty(key) => write!(f, "property `{key}` cannot be removed"),
            Self::PropertyType {
                key,
                expected,
                found,
            } => write!(f, "property `{key}` takes a {expected} value, got {found}"),
            Self::ReservedProperty(key) => write!(f, "property `{key}` is reserved"),
            Self::ForeignStore(node) => {
                write!(f, "node {node} belongs to a different store handle")
            }
            Self::TypeMismatch {
                node,
                expected,
                found: Some(found),
            } => write!(f, "node {node} is a {found}, not a {expected}"),
            Self::TypeMismatch {
                node,
                expected,
                found: None,
            } => write!(f, "node {node} carries no entity kind, expected a {expected}"),
            Self::UnexpectedRelationshipType {
                relationship,
                rel_type,
            } => write!(
                f,
                "relationship {relationship} is {rel_type}, not a dependency or allocation"
            ),
            Self::Graph(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Graph(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GraphError> for ModelError {
    fn from(value: GraphError) -> Self {
        Self::Graph(value)
    }
}
