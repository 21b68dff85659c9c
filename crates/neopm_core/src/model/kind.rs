use crate::graph::PropertyKey;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Type discriminant stored on every wrapped node.
///
/// Adding an entity kind means adding a variant here; loads match on it
/// exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    Task,
    Resource,
}

impl EntityKind {
    pub fn as_db_str(self) -> &'static str {
        match self {
            EntityKind::Project => "project",
            EntityKind::Task => "task",
            EntityKind::Resource => "resource",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "project" => Some(EntityKind::Project),
            "task" => Some(EntityKind::Task),
            "resource" => Some(EntityKind::Resource),
            _ => None,
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db_str())
    }
}

/// Reserved property key holding the discriminant.
#[derive(Debug, Clone, Copy)]
pub(crate) struct KindKey;

impl PropertyKey for KindKey {
    fn as_key(self) -> &'static str {
        "_kind"
    }
}
