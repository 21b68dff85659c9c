//! Reference anchors: one singleton node per top-level collection.
//!
//! # Responsibility
//! - Get-or-create the anchor hanging off the global root for a collection.
//! - Link members to their anchor and list them.
//!
//! # Invariants
//! - The root has at most one outgoing edge per anchor relationship type.
//! - Anchor membership is depth one; listing never follows other edges.
//! - Anchors are resolved once per open and handed around in an
//!   `AnchorTable`, never looked up through global state.

use crate::graph::traversal::{TraversalDescription, Traverser};
use crate::graph::{
    Direction, GraphRead, GraphResult, GraphTransaction, NodeId, RelType, RelationshipId,
    ROOT_NODE_ID,
};
use log::info;

/// Top-level collections anchored under the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorKind {
    Projects,
    Resources,
}

impl AnchorKind {
    pub const ALL: [AnchorKind; 2] = [AnchorKind::Projects, AnchorKind::Resources];

    /// Edge type from the root to this anchor.
    pub fn anchor_rel(self) -> RelType {
        match self {
            AnchorKind::Projects => RelType::MetaProject,
            AnchorKind::Resources => RelType::MetaResource,
        }
    }

    /// Edge type from this anchor to each member.
    pub fn member_rel(self) -> RelType {
        match self {
            AnchorKind::Projects => RelType::IsAProject,
            AnchorKind::Resources => RelType::IsAResource,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            AnchorKind::Projects => "projects",
            AnchorKind::Resources => "resources",
        }
    }
}

/// Resolved anchor node ids of one open store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorTable {
    projects: NodeId,
    resources: NodeId,
}

impl AnchorTable {
    /// Resolves every anchor, creating the missing ones.
    pub fn bootstrap(tx: &GraphTransaction<'_>) -> GraphResult<Self> {
        Ok(Self {
            projects: bootstrap_anchor(tx, AnchorKind::Projects)?,
            resources: bootstrap_anchor(tx, AnchorKind::Resources)?,
        })
    }

    pub fn get(&self, kind: AnchorKind) -> NodeId {
        match kind {
            AnchorKind::Projects => self.projects,
            AnchorKind::Resources => self.resources,
        }
    }
}

fn bootstrap_anchor(tx: &GraphTransaction<'_>, kind: AnchorKind) -> GraphResult<NodeId> {
    let (anchor, created) = get_or_create_anchor(tx, ROOT_NODE_ID, kind.anchor_rel())?;
    info!(
        "event=anchor_bootstrap module=graph status=ok anchor={} node_id={} created={}",
        kind.as_str(),
        anchor,
        created
    );
    Ok(anchor)
}

/// Returns the anchor reached from `root` via `anchor_rel`, creating the
/// anchor node and its edge when absent.
///
/// The returned flag tells whether the anchor was created by this call.
pub fn get_or_create_anchor(
    tx: &GraphTransaction<'_>,
    root: NodeId,
    anchor_rel: RelType,
) -> GraphResult<(NodeId, bool)> {
    if let Some(existing) = tx.single_relationship(root, anchor_rel, Direction::Outgoing)? {
        return Ok((existing.end, false));
    }
    let anchor = tx.create_node()?;
    tx.create_relationship(root, anchor, anchor_rel)?;
    Ok((anchor, true))
}

/// Links `member` into the collection of `anchor`.
pub fn register_member(
    tx: &GraphTransaction<'_>,
    anchor: NodeId,
    member_rel: RelType,
    member: NodeId,
) -> GraphResult<RelationshipId> {
    tx.create_relationship(anchor, member, member_rel)
}

/// One-hop listing of the members of `anchor`, anchor excluded.
pub fn list_members<G: GraphRead>(
    graph: &G,
    anchor: NodeId,
    member_rel: RelType,
) -> Traverser<'_> {
    Traverser::new(
        graph.connection(),
        anchor,
        TraversalDescription::one_hop(member_rel, Direction::Outgoing),
    )
}
