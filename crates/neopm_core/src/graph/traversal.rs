//! Lazy, bounded graph traversal.
//!
//! A traversal walks from a start node along edges matching its filters,
//! in breadth-first or depth-first order, until its stop condition prunes
//! further expansion. Each node is yielded at most once, and a start node
//! that does not exist fails with `NodeNotFound` as the first item.
//!
//! Depth limits apply to the shortest path found so far: a depth-first walk
//! that reaches a node again through a shorter path expands it again
//! (without yielding it twice), so both orders return the same set.
//!
//! # Read policy
//! Traversers observe live state: a node's neighbours are queried when that
//! node is expanded, through whichever connection the traverser borrows.
//! Created from a `GraphStore` with no scope open they see the latest
//! committed state; created from a `GraphTransaction` they also see that
//! transaction's pending writes. No snapshot is pinned at creation.
//!
//! # Determinism
//! Neighbours are expanded filter by filter, each in ascending relationship
//! id (creation) order, so the same graph always yields the same sequence.

use crate::graph::store::{load_relationships, node_exists};
use crate::graph::{Direction, GraphError, GraphResult, NodeId, RelType};
use rusqlite::Connection;
use std::collections::{HashMap, HashSet, VecDeque};

/// Visiting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    BreadthFirst,
    DepthFirst,
}

/// When to stop expanding a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCondition {
    /// Only direct neighbours of the start node.
    DepthOne,
    /// Nodes at most `n` hops away.
    MaxDepth(usize),
    /// Everything reachable.
    EndOfGraph,
}

impl StopCondition {
    fn allows_expansion(self, depth: usize) -> bool {
        match self {
            StopCondition::DepthOne => depth < 1,
            StopCondition::MaxDepth(max) => depth < max,
            StopCondition::EndOfGraph => true,
        }
    }
}

/// Which visited nodes are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inclusion {
    All,
    AllButStart,
}

/// One `(relationship type, direction)` pair to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeFilter {
    pub rel_type: RelType,
    pub direction: Direction,
}

impl EdgeFilter {
    pub const fn new(rel_type: RelType, direction: Direction) -> Self {
        Self {
            rel_type,
            direction,
        }
    }
}

/// Traversal configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalDescription {
    pub order: Order,
    pub stop: StopCondition,
    pub inclusion: Inclusion,
    pub edges: Vec<EdgeFilter>,
}

impl TraversalDescription {
    pub fn new(order: Order, stop: StopCondition, inclusion: Inclusion) -> Self {
        Self {
            order,
            stop,
            inclusion,
            edges: Vec::new(),
        }
    }

    /// Breadth-first, one hop, start node excluded, following one edge kind.
    ///
    /// The shape behind every "list children" and "list members" call.
    pub fn one_hop(rel_type: RelType, direction: Direction) -> Self {
        Self::new(
            Order::BreadthFirst,
            StopCondition::DepthOne,
            Inclusion::AllButStart,
        )
        .with_edge(rel_type, direction)
    }

    pub fn with_edge(mut self, rel_type: RelType, direction: Direction) -> Self {
        self.edges.push(EdgeFilter::new(rel_type, direction));
        self
    }
}

/// Lazy traversal iterator.
///
/// Yields `GraphResult<NodeId>`; after the first error it yields nothing
/// more. Dropping it part-way is fine, pending state is just freed.
pub struct Traverser<'c> {
    conn: &'c Connection,
    description: TraversalDescription,
    start: NodeId,
    frontier: VecDeque<(NodeId, usize)>,
    /// Shallowest depth each discovered node was reached at.
    depths: HashMap<NodeId, usize>,
    yielded: HashSet<NodeId>,
    checked_start: bool,
    failed: bool,
}

impl<'c> Traverser<'c> {
    pub fn new(conn: &'c Connection, start: NodeId, description: TraversalDescription) -> Self {
        let mut depths = HashMap::new();
        depths.insert(start, 0);
        let mut frontier = VecDeque::new();
        frontier.push_back((start, 0));
        Self {
            conn,
            description,
            start,
            frontier,
            depths,
            yielded: HashSet::new(),
            checked_start: false,
            failed: false,
        }
    }

    /// Collects the remaining node ids, stopping at the first error.
    pub fn collect_ids(self) -> GraphResult<Vec<NodeId>> {
        self.collect()
    }

    fn pop(&mut self) -> Option<(NodeId, usize)> {
        match self.description.order {
            Order::BreadthFirst => self.frontier.pop_front(),
            Order::DepthFirst => self.frontier.pop_back(),
        }
    }

    fn expand(&mut self, node: NodeId, depth: usize) -> GraphResult<()> {
        let mut discovered = Vec::new();
        for filter in &self.description.edges {
            for relationship in
                load_relationships(self.conn, node, Some(filter.rel_type), filter.direction)?
            {
                let Some(neighbor) = relationship.other_node(node) else {
                    continue;
                };
                let next_depth = depth + 1;
                let shallower = self
                    .depths
                    .get(&neighbor)
                    .map_or(true, |&known| next_depth < known);
                if shallower {
                    self.depths.insert(neighbor, next_depth);
                    discovered.push((neighbor, next_depth));
                }
            }
        }

        match self.description.order {
            Order::BreadthFirst => self.frontier.extend(discovered),
            // Reversed so the first-created edge is explored first.
            Order::DepthFirst => self.frontier.extend(discovered.into_iter().rev()),
        }
        Ok(())
    }

    fn fail(&mut self, err: GraphError) -> Option<GraphResult<NodeId>> {
        self.failed = true;
        self.frontier.clear();
        Some(Err(err))
    }

    fn is_returnable(&self, node: NodeId) -> bool {
        match self.description.inclusion {
            Inclusion::All => true,
            Inclusion::AllButStart => node != self.start,
        }
    }
}

impl Iterator for Traverser<'_> {
    type Item = GraphResult<NodeId>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if !self.checked_start {
            self.checked_start = true;
            match node_exists(self.conn, self.start) {
                Ok(true) => {}
                Ok(false) => return self.fail(GraphError::NodeNotFound(self.start)),
                Err(err) => return self.fail(err),
            }
        }
        while let Some((node, depth)) = self.pop() {
            // Superseded by a shallower entry for the same node.
            if self.depths.get(&node).is_some_and(|&best| best < depth) {
                continue;
            }
            if self.description.stop.allows_expansion(depth) {
                if let Err(err) = self.expand(node, depth) {
                    return self.fail(err);
                }
            }
            if self.is_returnable(node) && self.yielded.insert(node) {
                return Some(Ok(node));
            }
        }
        None
    }
}
