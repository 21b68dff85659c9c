//! Store manager: lifecycle of one store and entry point for top-level
//! entities.
//!
//! # Responsibility
//! - Open/close the graph store and resolve the reference anchors once.
//! - Create, look up and list top-level projects and resources.
//! - Reset the store (`clear_db`) and seed demo data (`populate_db`).
//!
//! # Invariants
//! - Anchors are resolved at open and after `clear_db`, nowhere else; a
//!   re-opened store reuses the anchors found under the root.
//! - Every wrapper borrows the manager, so none survives `close` or
//!   `clear_db`.

use crate::db::StoreOptions;
use crate::graph::anchor::{list_members, register_member};
use crate::graph::{
    AnchorKind, AnchorTable, Direction, GraphError, GraphRead, GraphStore, NodeId,
    RelationshipId,
};
use crate::model::{
    ModelResult, NodeEntity, Project, Resource, TaskRelationship, TypedNodes,
};
use log::{info, warn};
use std::path::Path;

/// Owner of one open store and its anchor table.
pub struct StoreManager {
    store: GraphStore,
    anchors: AnchorTable,
}

impl StoreManager {
    /// Opens (or creates) the store kept in directory `dir`.
    pub fn open(dir: impl AsRef<Path>) -> ModelResult<Self> {
        Self::open_with_options(dir, &StoreOptions::default())
    }

    pub fn open_with_options(dir: impl AsRef<Path>, options: &StoreOptions) -> ModelResult<Self> {
        Self::with_store(GraphStore::open_with_options(dir, options)?)
    }

    /// Opens a throwaway in-memory store.
    pub fn open_in_memory() -> ModelResult<Self> {
        Self::with_store(GraphStore::open_in_memory()?)
    }

    fn with_store(store: GraphStore) -> ModelResult<Self> {
        let anchors = store.in_transaction(|tx| AnchorTable::bootstrap(tx))?;
        info!(
            "event=store_ready module=manager status=ok projects_anchor={} resources_anchor={}",
            anchors.get(AnchorKind::Projects),
            anchors.get(AnchorKind::Resources)
        );
        Ok(Self { store, anchors })
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn anchors(&self) -> &AnchorTable {
        &self.anchors
    }

    /// Store directory, `None` for in-memory stores.
    pub fn location(&self) -> Option<&Path> {
        self.store.location()
    }

    pub fn close(self) -> ModelResult<()> {
        Ok(self.store.close()?)
    }

    /// Creates a top-level project.
    ///
    /// # Errors
    /// - `ModelError::BlankName`; no node is created.
    pub fn create_project(&self, name: &str) -> ModelResult<Project<'_>> {
        self.store.in_transaction(|tx| {
            let project = Project::create_in(tx, name)?;
            register_member(
                tx,
                self.anchors.get(AnchorKind::Projects),
                AnchorKind::Projects.member_rel(),
                project.id(),
            )?;
            Ok(project)
        })
    }

    /// Creates a top-level resource.
    pub fn create_resource(&self, name: &str) -> ModelResult<Resource<'_>> {
        self.store.in_transaction(|tx| {
            let resource = Resource::create_in(tx, name)?;
            register_member(
                tx,
                self.anchors.get(AnchorKind::Resources),
                AnchorKind::Resources.member_rel(),
                resource.id(),
            )?;
            Ok(resource)
        })
    }

    /// Looks up a top-level project.
    ///
    /// Returns `None` when the node exists but is not a member of the
    /// project anchor (a sub-project, a task, an anchor...).
    ///
    /// # Errors
    /// - `GraphError::NodeNotFound` when the id is absent.
    pub fn get_project_by_id(&self, id: NodeId) -> ModelResult<Option<Project<'_>>> {
        self.lookup_member(id, AnchorKind::Projects)
    }

    /// Looks up a top-level resource; same contract as `get_project_by_id`.
    pub fn get_resource_by_id(&self, id: NodeId) -> ModelResult<Option<Resource<'_>>> {
        self.lookup_member(id, AnchorKind::Resources)
    }

    /// Wraps a dependency or allocation edge by id.
    pub fn get_task_relationship_by_id(
        &self,
        id: RelationshipId,
    ) -> ModelResult<TaskRelationship<'_>> {
        TaskRelationship::load(&self.store, id)
    }

    /// Top-level projects in creation order. Sub-projects are not listed.
    pub fn all_projects(&self) -> TypedNodes<'_, Project<'_>> {
        self.members(AnchorKind::Projects)
    }

    pub fn all_resources(&self) -> TypedNodes<'_, Resource<'_>> {
        self.members(AnchorKind::Resources)
    }

    /// Deletes every node and relationship except the global root, then
    /// re-creates the anchors. Meant for tests and demos.
    pub fn clear_db(&mut self) -> ModelResult<()> {
        let (anchors, nodes, relationships) = self.store.in_transaction(|tx| {
            let (nodes, relationships) = tx.clear_all()?;
            let anchors = AnchorTable::bootstrap(tx)?;
            Ok::<_, GraphError>((anchors, nodes, relationships))
        })?;
        self.anchors = anchors;
        warn!(
            "event=store_clear module=manager status=ok deleted_nodes={} deleted_relationships={}",
            nodes, relationships
        );
        Ok(())
    }

    /// Seeds a small demo plan in one transaction and returns its project:
    /// "Launch" with tasks "Design" (10 days) and "Build" (6 days, depends
    /// on "Design"), plus a "Core team" resource allocated to the project and
    /// used by "Build".
    pub fn populate_db(&self) -> ModelResult<Project<'_>> {
        self.store.in_transaction(|tx| {
            let project = Project::create_in(tx, "Launch")?;
            register_member(
                tx,
                self.anchors.get(AnchorKind::Projects),
                AnchorKind::Projects.member_rel(),
                project.id(),
            )?;

            let design = project.create_task_in(tx, "Design")?;
            let build = project.create_task_in(tx, "Build")?;
            design.set_duration_in(tx, Some(60 * 24 * 10))?;
            build.set_duration_in(tx, Some(60 * 24 * 6))?;
            build.add_dependent_on_in(tx, &design)?;

            let team = Resource::create_in(tx, "Core team")?;
            register_member(
                tx,
                self.anchors.get(AnchorKind::Resources),
                AnchorKind::Resources.member_rel(),
                team.id(),
            )?;
            project.allocate_resource_in(tx, &team)?;
            build.use_resource_in(tx, &team)?;

            info!(
                "event=store_populate module=manager status=ok project_id={}",
                project.id()
            );
            Ok(project)
        })
    }

    fn members<'g, E: NodeEntity<'g>>(&'g self, kind: AnchorKind) -> TypedNodes<'g, E> {
        TypedNodes::new(
            &self.store,
            list_members(&self.store, self.anchors.get(kind), kind.member_rel()),
        )
    }

    fn lookup_member<'g, E: NodeEntity<'g>>(
        &'g self,
        id: NodeId,
        kind: AnchorKind,
    ) -> ModelResult<Option<E>> {
        self.store.get_node_by_id(id)?;
        let anchor = self.anchors.get(kind);
        let is_member = self
            .store
            .relationships(id, Some(kind.member_rel()), Direction::Incoming)?
            .iter()
            .any(|membership| membership.start == anchor);
        if !is_member {
            return Ok(None);
        }
        E::load(&self.store, id).map(Some)
    }
}
