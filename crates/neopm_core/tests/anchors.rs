use neopm_core::graph::anchor::{get_or_create_anchor, list_members, register_member};
use neopm_core::graph::{
    AnchorKind, AnchorTable, Direction, GraphError, GraphRead, GraphStore, RelType, ROOT_NODE_ID,
};

#[test]
fn get_or_create_anchor_is_idempotent() {
    let store = GraphStore::open_in_memory().unwrap();

    let (first, created_first) = store
        .in_transaction(|tx| get_or_create_anchor(tx, ROOT_NODE_ID, RelType::MetaProject))
        .unwrap();
    let (second, created_second) = store
        .in_transaction(|tx| get_or_create_anchor(tx, ROOT_NODE_ID, RelType::MetaProject))
        .unwrap();

    assert!(created_first);
    assert!(!created_second);
    assert_eq!(first, second);
    assert_eq!(
        store
            .relationships(ROOT_NODE_ID, Some(RelType::MetaProject), Direction::Outgoing)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn anchor_creation_rolls_back_with_its_scope() {
    let store = GraphStore::open_in_memory().unwrap();

    let tx = store.begin_transaction().unwrap();
    get_or_create_anchor(&tx, ROOT_NODE_ID, RelType::MetaResource).unwrap();
    drop(tx);

    assert_eq!(store.node_count().unwrap(), 1);
    assert!(!store
        .has_relationship(ROOT_NODE_ID, RelType::MetaResource, Direction::Outgoing)
        .unwrap());
}

#[test]
fn bootstrap_resolves_distinct_anchors_per_kind() {
    let store = GraphStore::open_in_memory().unwrap();
    let table = store.in_transaction(|tx| AnchorTable::bootstrap(tx)).unwrap();
    let again = store.in_transaction(|tx| AnchorTable::bootstrap(tx)).unwrap();

    assert_eq!(table, again);
    assert_ne!(
        table.get(AnchorKind::Projects),
        table.get(AnchorKind::Resources)
    );
    assert_eq!(store.node_count().unwrap(), 3);
}

#[test]
fn anchors_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let store = GraphStore::open(dir.path()).unwrap();
    let first = store.in_transaction(|tx| AnchorTable::bootstrap(tx)).unwrap();
    store.close().unwrap();

    let store = GraphStore::open(dir.path()).unwrap();
    let second = store.in_transaction(|tx| AnchorTable::bootstrap(tx)).unwrap();

    assert_eq!(first, second);
    for kind in AnchorKind::ALL {
        let edges = store
            .relationships(ROOT_NODE_ID, Some(kind.anchor_rel()), Direction::Outgoing)
            .unwrap();
        assert_eq!(edges.len(), 1, "one anchor edge for {kind:?}");
    }
}

#[test]
fn list_members_is_one_hop_and_excludes_the_anchor() {
    let store = GraphStore::open_in_memory().unwrap();
    let (anchor, members) = store
        .in_transaction(|tx| {
            let (anchor, _) = get_or_create_anchor(tx, ROOT_NODE_ID, RelType::MetaProject)?;
            let first = tx.create_node()?;
            let second = tx.create_node()?;
            let nested = tx.create_node()?;
            register_member(tx, anchor, RelType::IsAProject, first)?;
            register_member(tx, anchor, RelType::IsAProject, second)?;
            // Nested below a member; must not be listed.
            register_member(tx, first, RelType::IsAProject, nested)?;
            Ok::<_, GraphError>((anchor, vec![first, second]))
        })
        .unwrap();

    let listed = list_members(&store, anchor, RelType::IsAProject)
        .collect_ids()
        .unwrap();
    assert_eq!(listed, members);

    let empty = list_members(&store, anchor, RelType::IsAResource)
        .collect_ids()
        .unwrap();
    assert!(empty.is_empty());
}
