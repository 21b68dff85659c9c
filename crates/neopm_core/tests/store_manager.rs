use neopm_core::graph::{AnchorKind, Direction, GraphRead, RelType, ROOT_NODE_ID};
use neopm_core::{ModelResult, NodeEntity, NodeId, Project, Resource, StoreManager, Task};
use std::collections::BTreeSet;

fn project_names(manager: &StoreManager) -> Vec<String> {
    manager
        .all_projects()
        .map(|project| project.unwrap().name().unwrap())
        .collect()
}

fn resource_names(manager: &StoreManager) -> Vec<String> {
    manager
        .all_resources()
        .map(|resource| resource.unwrap().name().unwrap())
        .collect()
}

fn task_names<'g>(tasks: impl Iterator<Item = ModelResult<Task<'g>>>) -> Vec<String> {
    tasks.map(|task| task.unwrap().name().unwrap()).collect()
}

#[test]
fn fresh_store_has_root_and_two_anchors() {
    let manager = StoreManager::open_in_memory().unwrap();

    assert_eq!(manager.store().node_count().unwrap(), 3);
    assert!(project_names(&manager).is_empty());
    assert!(resource_names(&manager).is_empty());
    assert!(manager.location().is_none());
}

#[test]
fn top_level_projects_are_listed_once_each() {
    let manager = StoreManager::open_in_memory().unwrap();
    let ids: BTreeSet<NodeId> = ["P3", "P1", "P2"]
        .into_iter()
        .map(|name| manager.create_project(name).unwrap().id())
        .collect();

    let listed: Vec<NodeId> = manager
        .all_projects()
        .map(|project| project.unwrap().id())
        .collect();

    assert_eq!(listed.len(), 3);
    assert_eq!(listed.iter().copied().collect::<BTreeSet<_>>(), ids);
    assert_eq!(project_names(&manager), vec!["P3", "P1", "P2"]);
}

#[test]
fn sub_projects_stay_out_of_the_top_level_listing() {
    let manager = StoreManager::open_in_memory().unwrap();
    let p1 = manager.create_project("P1").unwrap();
    let nested = p1.create_sub_project("Nested").unwrap();

    assert_eq!(project_names(&manager), vec!["P1"]);
    let children: Vec<NodeId> = p1.sub_projects().map(|p| p.unwrap().id()).collect();
    assert_eq!(children, vec![nested.id()]);
}

#[test]
fn lookup_requires_membership_in_the_matching_anchor() {
    let manager = StoreManager::open_in_memory().unwrap();
    let launch = manager.create_project("Launch").unwrap();
    let nested = launch.create_sub_project("Nested").unwrap();
    let design = launch.create_task("Design").unwrap();
    let alice = manager.create_resource("Alice").unwrap();

    assert_eq!(manager.get_project_by_id(launch.id()).unwrap(), Some(launch));
    assert_eq!(manager.get_project_by_id(nested.id()).unwrap(), None);
    assert_eq!(manager.get_project_by_id(design.id()).unwrap(), None);
    assert_eq!(manager.get_project_by_id(alice.id()).unwrap(), None);
    assert_eq!(manager.get_resource_by_id(alice.id()).unwrap(), Some(alice));
    assert_eq!(manager.get_resource_by_id(launch.id()).unwrap(), None);
}

#[test]
fn lookup_of_a_missing_id_is_not_found() {
    let manager = StoreManager::open_in_memory().unwrap();

    let err = manager.get_project_by_id(NodeId::new(9_000)).unwrap_err();
    assert!(err.is_not_found());
    let err = manager.get_resource_by_id(NodeId::new(9_000)).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn blank_resource_name_creates_nothing() {
    let manager = StoreManager::open_in_memory().unwrap();
    let before = manager.store().node_count().unwrap();

    assert!(manager.create_resource(" ").unwrap_err().is_invalid_argument());
    assert_eq!(manager.store().node_count().unwrap(), before);
}

#[test]
fn resources_are_listed_and_renamed() {
    let manager = StoreManager::open_in_memory().unwrap();
    let alice = manager.create_resource("Alice").unwrap();
    manager.create_resource("Bob").unwrap();

    alice.set_name("Alice B.").unwrap();

    assert_eq!(resource_names(&manager), vec!["Alice B.", "Bob"]);
}

#[test]
fn clear_db_empties_both_collections_and_keeps_working() {
    let mut manager = StoreManager::open_in_memory().unwrap();
    manager.populate_db().unwrap();
    manager.create_project("Extra").unwrap();
    let old_anchors = *manager.anchors();

    manager.clear_db().unwrap();

    assert!(project_names(&manager).is_empty());
    assert!(resource_names(&manager).is_empty());
    assert_eq!(manager.store().node_count().unwrap(), 3);
    assert_ne!(*manager.anchors(), old_anchors);

    let fresh = manager.create_project("Fresh").unwrap();
    assert_eq!(project_names(&manager), vec!["Fresh"]);
    assert_eq!(manager.get_project_by_id(fresh.id()).unwrap(), Some(fresh));
}

#[test]
fn reopening_keeps_projects_and_anchors() {
    let dir = tempfile::tempdir().unwrap();

    let manager = StoreManager::open(dir.path()).unwrap();
    assert_eq!(manager.location(), Some(dir.path()));
    let first_anchors = *manager.anchors();
    manager.create_project("Alpha").unwrap();
    manager.create_project("Beta").unwrap();
    manager.close().unwrap();

    let manager = StoreManager::open(dir.path()).unwrap();
    assert_eq!(*manager.anchors(), first_anchors);
    assert_eq!(project_names(&manager), vec!["Alpha", "Beta"]);
    for kind in AnchorKind::ALL {
        let anchor_edges = manager
            .store()
            .relationships(ROOT_NODE_ID, Some(kind.anchor_rel()), Direction::Outgoing)
            .unwrap();
        assert_eq!(anchor_edges.len(), 1);
    }
}

#[test]
fn populate_db_builds_the_launch_plan() {
    let manager = StoreManager::open_in_memory().unwrap();
    let launch = manager.populate_db().unwrap();

    assert_eq!(launch.name().unwrap(), "Launch");
    assert_eq!(project_names(&manager), vec!["Launch"]);
    assert_eq!(task_names(launch.all_tasks()), vec!["Design", "Build"]);

    let tasks: Vec<Task<'_>> = launch.all_tasks().map(|task| task.unwrap()).collect();
    let (design, build) = (tasks[0], tasks[1]);
    assert_eq!(design.duration_in_minutes().unwrap(), Some(14_400));
    assert_eq!(build.duration_in_minutes().unwrap(), Some(8_640));
    assert_eq!(task_names(build.dependencies()), vec!["Design"]);
    assert_eq!(task_names(design.dependent_tasks()), vec!["Build"]);

    let team: Vec<Resource<'_>> = launch.resources().map(|r| r.unwrap()).collect();
    assert_eq!(team.len(), 1);
    assert_eq!(resource_names(&manager), vec!["Core team"]);
    assert_eq!(task_names(team[0].tasks()), vec!["Build"]);
}

#[test]
fn populate_db_is_one_transaction() {
    let manager = StoreManager::open_in_memory().unwrap();
    let tx = manager.store().begin_transaction().unwrap();

    // A second scope cannot open while one is alive, so nothing is seeded.
    assert!(manager.populate_db().is_err());
    drop(tx);

    assert!(project_names(&manager).is_empty());
    assert_eq!(manager.store().node_count().unwrap(), 3);
}

#[test]
fn typed_listing_stops_at_the_anchor_edges() {
    let manager = StoreManager::open_in_memory().unwrap();
    let launch = manager.create_project("Launch").unwrap();
    launch.create_task("Design").unwrap();

    let anchor = manager.anchors().get(AnchorKind::Projects);
    let members = manager
        .store()
        .relationships(anchor, Some(RelType::IsAProject), Direction::Outgoing)
        .unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(
        Project::load(manager.store(), members[0].end).unwrap(),
        launch
    );
}
