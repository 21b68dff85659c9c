use neopm_core::graph::{
    Direction, GraphError, GraphRead, GraphStore, NodeId, PropertyKey, PropertyValue, RelType,
    ROOT_NODE_ID,
};

#[derive(Debug, Clone, Copy)]
enum Key {
    Label,
    Weight,
}

impl PropertyKey for Key {
    fn as_key(self) -> &'static str {
        match self {
            Key::Label => "label",
            Key::Weight => "weight",
        }
    }
}

#[test]
fn committed_nodes_are_visible_and_dropped_scopes_roll_back() {
    let store = GraphStore::open_in_memory().unwrap();

    let tx = store.begin_transaction().unwrap();
    let kept = tx.create_node().unwrap();
    tx.commit().unwrap();

    let tx = store.begin_transaction().unwrap();
    let discarded = tx.create_node().unwrap();
    assert!(tx.node_exists(discarded).unwrap());
    drop(tx);

    assert!(store.node_exists(kept).unwrap());
    assert!(!store.node_exists(discarded).unwrap());
    assert_eq!(store.node_count().unwrap(), 2);
}

#[test]
fn in_transaction_rolls_back_when_the_operation_fails() {
    let store = GraphStore::open_in_memory().unwrap();

    let result: Result<(), GraphError> = store.in_transaction(|tx| {
        let node = tx.create_node()?;
        tx.create_relationship(node, NodeId::new(9_999), RelType::DependOn)?;
        Ok(())
    });

    assert!(matches!(result, Err(GraphError::NodeNotFound(id)) if id == NodeId::new(9_999)));
    assert_eq!(store.node_count().unwrap(), 1, "only the root survives");
    assert_eq!(store.relationship_count().unwrap(), 0);
}

#[test]
fn explicit_rollback_discards_changes() {
    let store = GraphStore::open_in_memory().unwrap();

    let tx = store.begin_transaction().unwrap();
    tx.create_node().unwrap();
    tx.rollback().unwrap();

    assert_eq!(store.node_ids().unwrap(), vec![ROOT_NODE_ID]);
}

#[test]
fn fresh_nodes_have_unique_ids_and_empty_bags() {
    let store = GraphStore::open_in_memory().unwrap();
    let (first, second) = store
        .in_transaction(|tx| Ok::<_, GraphError>((tx.create_node()?, tx.create_node()?)))
        .unwrap();

    assert_ne!(first, second);
    assert!(store.get_node_by_id(first).unwrap().properties.is_empty());
}

#[test]
fn missing_node_is_not_found() {
    let store = GraphStore::open_in_memory().unwrap();
    let err = store.get_node_by_id(NodeId::new(77)).unwrap_err();
    assert!(matches!(err, GraphError::NodeNotFound(id) if id == NodeId::new(77)));
}

#[test]
fn node_with_relationships_cannot_be_deleted() {
    let store = GraphStore::open_in_memory().unwrap();
    let (a, b, rel) = store
        .in_transaction(|tx| {
            let a = tx.create_node()?;
            let b = tx.create_node()?;
            let rel = tx.create_relationship(a, b, RelType::DependOn)?;
            Ok::<_, GraphError>((a, b, rel))
        })
        .unwrap();

    let err = store
        .in_transaction(|tx| tx.delete_node(a))
        .unwrap_err();
    assert!(matches!(err, GraphError::NodeHasRelationships { node, count: 1 } if node == a));

    store
        .in_transaction(|tx| {
            tx.delete_relationship(rel)?;
            tx.delete_node(a)
        })
        .unwrap();
    assert!(!store.node_exists(a).unwrap());
    assert!(store.node_exists(b).unwrap());
}

#[test]
fn root_node_is_protected() {
    let store = GraphStore::open_in_memory().unwrap();
    let err = store
        .in_transaction(|tx| tx.delete_node(ROOT_NODE_ID))
        .unwrap_err();
    assert!(matches!(err, GraphError::RootNodeProtected));
}

#[test]
fn deleting_a_missing_relationship_is_not_found() {
    let store = GraphStore::open_in_memory().unwrap();
    let err = store
        .in_transaction(|tx| tx.delete_relationship(neopm_core::RelationshipId::new(5)))
        .unwrap_err();
    assert!(matches!(err, GraphError::RelationshipNotFound(_)));
}

#[test]
fn node_properties_upsert_and_remove() {
    let store = GraphStore::open_in_memory().unwrap();
    let node = store
        .in_transaction(|tx| {
            let node = tx.create_node()?;
            tx.set_node_property(node, Key::Label, &"draft".into())?;
            tx.set_node_property(node, Key::Weight, &PropertyValue::Integer(3))?;
            tx.set_node_property(node, Key::Label, &"final".into())?;
            Ok::<_, GraphError>(node)
        })
        .unwrap();

    assert_eq!(
        store.node_property(node, Key::Label).unwrap(),
        Some(PropertyValue::Text("final".to_string()))
    );
    assert_eq!(store.get_node_by_id(node).unwrap().properties.len(), 2);

    let removed = store
        .in_transaction(|tx| tx.remove_node_property(node, Key::Weight))
        .unwrap();
    assert!(removed);
    let removed_again = store
        .in_transaction(|tx| tx.remove_node_property(node, Key::Weight))
        .unwrap();
    assert!(!removed_again);
    assert_eq!(store.node_property(node, Key::Weight).unwrap(), None);
}

#[test]
fn relationship_properties_follow_their_edge() {
    let store = GraphStore::open_in_memory().unwrap();
    let rel = store
        .in_transaction(|tx| {
            let a = tx.create_node()?;
            let b = tx.create_node()?;
            let rel = tx.create_relationship(a, b, RelType::UseResource)?;
            tx.set_relationship_property(rel, Key::Weight, &PropertyValue::Integer(50))?;
            Ok::<_, GraphError>(rel)
        })
        .unwrap();

    assert_eq!(
        store.relationship_property(rel, Key::Weight).unwrap(),
        Some(PropertyValue::Integer(50))
    );

    store.in_transaction(|tx| tx.delete_relationship(rel)).unwrap();
    assert!(matches!(
        store.get_relationship_by_id(rel),
        Err(GraphError::RelationshipNotFound(_))
    ));
    assert!(store.relationship_properties(rel).unwrap().is_empty());
}

#[test]
fn relationships_are_listed_in_creation_order_per_direction() {
    let store = GraphStore::open_in_memory().unwrap();
    let (hub, first, second, third) = store
        .in_transaction(|tx| {
            let hub = tx.create_node()?;
            let first = tx.create_node()?;
            let second = tx.create_node()?;
            let third = tx.create_node()?;
            tx.create_relationship(hub, first, RelType::IncludeTask)?;
            tx.create_relationship(second, hub, RelType::IncludeProject)?;
            tx.create_relationship(hub, third, RelType::IncludeTask)?;
            Ok::<_, GraphError>((hub, first, second, third))
        })
        .unwrap();

    let outgoing: Vec<NodeId> = store
        .relationships(hub, Some(RelType::IncludeTask), Direction::Outgoing)
        .unwrap()
        .iter()
        .map(|rel| rel.end)
        .collect();
    assert_eq!(outgoing, vec![first, third]);

    let both: Vec<NodeId> = store
        .relationships(hub, None, Direction::Both)
        .unwrap()
        .iter()
        .filter_map(|rel| rel.other_node(hub))
        .collect();
    assert_eq!(both, vec![first, second, third]);

    assert!(store
        .has_relationship(hub, RelType::IncludeProject, Direction::Incoming)
        .unwrap());
    assert!(!store
        .has_relationship(hub, RelType::IncludeProject, Direction::Outgoing)
        .unwrap());
}

#[test]
fn single_relationship_rejects_multiple_matches() {
    let store = GraphStore::open_in_memory().unwrap();
    let hub = store
        .in_transaction(|tx| {
            let hub = tx.create_node()?;
            for _ in 0..2 {
                let leaf = tx.create_node()?;
                tx.create_relationship(hub, leaf, RelType::IncludeTask)?;
            }
            Ok::<_, GraphError>(hub)
        })
        .unwrap();

    assert!(store
        .single_relationship(hub, RelType::DependOn, Direction::Outgoing)
        .unwrap()
        .is_none());
    let err = store
        .single_relationship(hub, RelType::IncludeTask, Direction::Outgoing)
        .unwrap_err();
    assert!(matches!(err, GraphError::MultipleRelationships { count: 2, .. }));
}

#[test]
fn clear_all_keeps_only_the_root() {
    let store = GraphStore::open_in_memory().unwrap();
    store
        .in_transaction(|tx| {
            let a = tx.create_node()?;
            let b = tx.create_node()?;
            tx.create_relationship(ROOT_NODE_ID, a, RelType::MetaProject)?;
            tx.create_relationship(a, b, RelType::IsAProject)?;
            Ok::<_, GraphError>(())
        })
        .unwrap();

    let (nodes, relationships) = store.in_transaction(|tx| tx.clear_all()).unwrap();

    assert_eq!((nodes, relationships), (2, 2));
    assert_eq!(store.node_ids().unwrap(), vec![ROOT_NODE_ID]);
    assert_eq!(store.relationship_count().unwrap(), 0);
}

#[test]
fn store_reopens_from_its_directory() {
    let dir = tempfile::tempdir().unwrap();

    let store = GraphStore::open(dir.path()).unwrap();
    assert_eq!(store.location(), Some(dir.path()));
    let node = store
        .in_transaction(|tx| {
            let node = tx.create_node()?;
            tx.set_node_property(node, Key::Label, &"kept".into())?;
            Ok::<_, GraphError>(node)
        })
        .unwrap();
    store.close().unwrap();

    let reopened = GraphStore::open(dir.path()).unwrap();
    assert_eq!(
        reopened.node_property(node, Key::Label).unwrap(),
        Some(PropertyValue::Text("kept".to_string()))
    );
}

#[test]
fn in_memory_store_has_no_location() {
    let store = GraphStore::open_in_memory().unwrap();
    assert!(store.location().is_none());
}
