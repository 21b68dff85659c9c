use neopm_core::graph::{
    Direction, GraphError, GraphRead, GraphStore, Inclusion, NodeId, Order, RelType,
    StopCondition, TraversalDescription,
};

/// a -> b, a -> c, b -> d, c -> d, d -> a (all INCLUDE_PROJECT), plus
/// a -> e (DEPEND_ON).
struct Diamond {
    store: GraphStore,
    a: NodeId,
    b: NodeId,
    c: NodeId,
    d: NodeId,
    e: NodeId,
}

fn diamond() -> Diamond {
    let store = GraphStore::open_in_memory().unwrap();
    let [a, b, c, d, e] = store
        .in_transaction(|tx| {
            let ids = [
                tx.create_node()?,
                tx.create_node()?,
                tx.create_node()?,
                tx.create_node()?,
                tx.create_node()?,
            ];
            let [a, b, c, d, e] = ids;
            tx.create_relationship(a, b, RelType::IncludeProject)?;
            tx.create_relationship(a, c, RelType::IncludeProject)?;
            tx.create_relationship(b, d, RelType::IncludeProject)?;
            tx.create_relationship(c, d, RelType::IncludeProject)?;
            tx.create_relationship(d, a, RelType::IncludeProject)?;
            tx.create_relationship(a, e, RelType::DependOn)?;
            Ok::<_, GraphError>(ids)
        })
        .unwrap();
    Diamond {
        store,
        a,
        b,
        c,
        d,
        e,
    }
}

fn walk(graph: &Diamond, start: NodeId, description: TraversalDescription) -> Vec<NodeId> {
    graph.store.traverse(start, description).collect_ids().unwrap()
}

#[test]
fn breadth_first_visits_each_reachable_node_once() {
    let g = diamond();
    let description =
        TraversalDescription::new(Order::BreadthFirst, StopCondition::EndOfGraph, Inclusion::All)
            .with_edge(RelType::IncludeProject, Direction::Outgoing);

    assert_eq!(walk(&g, g.a, description), vec![g.a, g.b, g.c, g.d]);
}

#[test]
fn depth_first_follows_the_first_created_edge_first() {
    let g = diamond();
    let description =
        TraversalDescription::new(Order::DepthFirst, StopCondition::EndOfGraph, Inclusion::All)
            .with_edge(RelType::IncludeProject, Direction::Outgoing);

    assert_eq!(walk(&g, g.a, description), vec![g.a, g.b, g.d, g.c]);
}

#[test]
fn one_hop_lists_direct_children_without_the_start() {
    let g = diamond();
    let children = walk(
        &g,
        g.a,
        TraversalDescription::one_hop(RelType::IncludeProject, Direction::Outgoing),
    );
    assert_eq!(children, vec![g.b, g.c]);
}

#[test]
fn max_depth_bounds_the_walk() {
    let g = diamond();
    let description = TraversalDescription::new(
        Order::BreadthFirst,
        StopCondition::MaxDepth(2),
        Inclusion::AllButStart,
    )
    .with_edge(RelType::IncludeProject, Direction::Outgoing);

    assert_eq!(walk(&g, g.a, description.clone()), vec![g.b, g.c, g.d]);

    let shallow = TraversalDescription {
        stop: StopCondition::MaxDepth(0),
        inclusion: Inclusion::All,
        ..description
    };
    assert_eq!(walk(&g, g.a, shallow), vec![g.a]);
}

#[test]
fn incoming_edges_walk_backwards() {
    let g = diamond();
    let description =
        TraversalDescription::new(Order::BreadthFirst, StopCondition::EndOfGraph, Inclusion::All)
            .with_edge(RelType::IncludeProject, Direction::Incoming);

    assert_eq!(walk(&g, g.d, description), vec![g.d, g.b, g.c, g.a]);
}

#[test]
fn both_directions_follow_edges_in_creation_order() {
    let g = diamond();
    let neighbours = walk(
        &g,
        g.b,
        TraversalDescription::one_hop(RelType::IncludeProject, Direction::Both),
    );
    assert_eq!(neighbours, vec![g.a, g.d]);
}

#[test]
fn edge_filters_restrict_and_combine() {
    let g = diamond();

    let dependencies = walk(
        &g,
        g.a,
        TraversalDescription::one_hop(RelType::DependOn, Direction::Outgoing),
    );
    assert_eq!(dependencies, vec![g.e]);

    let combined = walk(
        &g,
        g.a,
        TraversalDescription::one_hop(RelType::IncludeProject, Direction::Outgoing)
            .with_edge(RelType::DependOn, Direction::Outgoing),
    );
    assert_eq!(combined, vec![g.b, g.c, g.e]);
}

#[test]
fn partial_consumption_is_allowed() {
    let g = diamond();
    let mut traverser = g.store.traverse(
        g.a,
        TraversalDescription::new(Order::BreadthFirst, StopCondition::EndOfGraph, Inclusion::All)
            .with_edge(RelType::IncludeProject, Direction::Both),
    );

    assert_eq!(traverser.next().unwrap().unwrap(), g.a);
    drop(traverser);

    let again = walk(
        &g,
        g.a,
        TraversalDescription::one_hop(RelType::IncludeProject, Direction::Outgoing),
    );
    assert_eq!(again.len(), 2);
}

#[test]
fn traversal_without_filters_yields_only_the_start() {
    let g = diamond();
    let description =
        TraversalDescription::new(Order::BreadthFirst, StopCondition::EndOfGraph, Inclusion::All);
    assert_eq!(walk(&g, g.a, description), vec![g.a]);
}

#[test]
fn traversal_inside_a_transaction_sees_pending_edges() {
    let g = diamond();
    let tx = g.store.begin_transaction().unwrap();
    let extra = tx.create_node().unwrap();
    tx.create_relationship(g.e, extra, RelType::DependOn).unwrap();

    let seen = tx
        .traverse(
            g.e,
            TraversalDescription::one_hop(RelType::DependOn, Direction::Outgoing),
        )
        .collect_ids()
        .unwrap();
    assert_eq!(seen, vec![extra]);
    drop(tx);

    let after_rollback = walk(
        &g,
        g.e,
        TraversalDescription::one_hop(RelType::DependOn, Direction::Outgoing),
    );
    assert!(after_rollback.is_empty());
}

#[test]
fn depth_first_max_depth_finds_nodes_behind_a_shorter_path() {
    // s -> a -> b -> x -> y is too long, but s -> d -> x -> y fits in three hops.
    let store = GraphStore::open_in_memory().unwrap();
    let [s, a, b, d, x, y] = store
        .in_transaction(|tx| {
            let ids = [
                tx.create_node()?,
                tx.create_node()?,
                tx.create_node()?,
                tx.create_node()?,
                tx.create_node()?,
                tx.create_node()?,
            ];
            let [s, a, b, d, x, y] = ids;
            for (from, to) in [(s, a), (s, d), (a, b), (b, x), (d, x), (x, y)] {
                tx.create_relationship(from, to, RelType::IncludeProject)?;
            }
            Ok::<_, GraphError>(ids)
        })
        .unwrap();

    let bounded = |order: Order| {
        TraversalDescription::new(order, StopCondition::MaxDepth(3), Inclusion::AllButStart)
            .with_edge(RelType::IncludeProject, Direction::Outgoing)
    };
    let breadth_first = store
        .traverse(s, bounded(Order::BreadthFirst))
        .collect_ids()
        .unwrap();
    let depth_first = store
        .traverse(s, bounded(Order::DepthFirst))
        .collect_ids()
        .unwrap();

    assert_eq!(breadth_first, vec![a, d, b, x, y]);
    assert_eq!(depth_first, vec![a, b, x, d, y]);
}

#[test]
fn missing_start_node_fails_first_then_stops() {
    let g = diamond();
    let missing = NodeId::new(9_999);
    let mut traverser = g.store.traverse(
        missing,
        TraversalDescription::new(Order::BreadthFirst, StopCondition::EndOfGraph, Inclusion::All)
            .with_edge(RelType::IncludeProject, Direction::Outgoing),
    );

    assert!(matches!(
        traverser.next(),
        Some(Err(GraphError::NodeNotFound(id))) if id == missing
    ));
    assert!(traverser.next().is_none());
}
