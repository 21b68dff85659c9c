//! Transactional node/relationship/property store over SQLite.
//!
//! # Responsibility
//! - Own the single connection of one embedded store.
//! - Hand out scoped transaction guards; every mutation goes through one.
//! - Provide id lookups, relationship queries and property access.
//!
//! # Invariants
//! - Mutating methods only exist on `GraphTransaction`.
//! - A transaction guard rolls back on drop unless `commit` was called.
//! - Nodes are deleted only once no relationship references them; the
//!   unguarded bulk path is `GraphTransaction::clear_all`.
//! - Reads through `GraphStore` outside any open scope observe the latest
//!   committed state; reads through a `GraphTransaction` also observe its
//!   own pending writes.

use crate::db::{open_db_in_memory, open_store_dir, StoreOptions};
use crate::graph::traversal::{TraversalDescription, Traverser};
use crate::graph::{
    Direction, GraphError, GraphResult, Node, NodeId, PropertyBag, PropertyKey, PropertyValue,
    RelType, Relationship, RelationshipId, ROOT_NODE_ID,
};
use log::{debug, info};
use rusqlite::{
    params, Connection, DropBehavior, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use std::path::{Path, PathBuf};

/// Read access shared by the store handle and open transactions.
pub trait GraphRead {
    /// Connection the reads are issued through.
    fn connection(&self) -> &Connection;

    fn node_exists(&self, id: NodeId) -> GraphResult<bool> {
        node_exists(self.connection(), id)
    }

    /// Loads one node with its full property bag.
    ///
    /// # Errors
    /// - `GraphError::NodeNotFound` when the id is absent.
    fn get_node_by_id(&self, id: NodeId) -> GraphResult<Node> {
        ensure_node_exists(self.connection(), id)?;
        Ok(Node {
            id,
            properties: load_node_properties(self.connection(), id)?,
        })
    }

    /// Loads one relationship.
    ///
    /// # Errors
    /// - `GraphError::RelationshipNotFound` when the id is absent.
    fn get_relationship_by_id(&self, id: RelationshipId) -> GraphResult<Relationship> {
        self.connection()
            .query_row(
                "SELECT id, rel_type, start_node, end_node
                 FROM relationships
                 WHERE id = ?1;",
                [id.get()],
                |row| Ok(parse_relationship_row(row)),
            )
            .optional()?
            .ok_or(GraphError::RelationshipNotFound(id))?
    }

    /// Relationships of `node` matching the filter, in creation order.
    fn relationships(
        &self,
        node: NodeId,
        rel_type: Option<RelType>,
        direction: Direction,
    ) -> GraphResult<Vec<Relationship>> {
        load_relationships(self.connection(), node, rel_type, direction)
    }

    fn has_relationship(
        &self,
        node: NodeId,
        rel_type: RelType,
        direction: Direction,
    ) -> GraphResult<bool> {
        let sql = match direction {
            Direction::Outgoing => {
                "SELECT EXISTS(
                    SELECT 1 FROM relationships WHERE start_node = ?1 AND rel_type = ?2
                );"
            }
            Direction::Incoming => {
                "SELECT EXISTS(
                    SELECT 1 FROM relationships WHERE end_node = ?1 AND rel_type = ?2
                );"
            }
            Direction::Both => {
                "SELECT EXISTS(
                    SELECT 1 FROM relationships
                    WHERE (start_node = ?1 OR end_node = ?1) AND rel_type = ?2
                );"
            }
        };
        let exists: i64 = self.connection().query_row(
            sql,
            params![node.get(), rel_type.as_db_str()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    /// Returns the only matching relationship, if any.
    ///
    /// # Errors
    /// - `GraphError::MultipleRelationships` when more than one matches.
    fn single_relationship(
        &self,
        node: NodeId,
        rel_type: RelType,
        direction: Direction,
    ) -> GraphResult<Option<Relationship>> {
        let mut matches = self.relationships(node, Some(rel_type), direction)?;
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            count => Err(GraphError::MultipleRelationships {
                node,
                rel_type,
                direction,
                count,
            }),
        }
    }

    fn node_property<K: PropertyKey>(
        &self,
        node: NodeId,
        key: K,
    ) -> GraphResult<Option<PropertyValue>> {
        let key = key.as_key();
        let row = self
            .connection()
            .query_row(
                "SELECT value_type, text_value, int_value
                 FROM node_properties
                 WHERE node_id = ?1 AND key = ?2;",
                params![node.get(), key],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                    ))
                },
            )
            .optional()?;
        row.map(|(value_type, text, int)| PropertyValue::from_columns(key, &value_type, text, int))
            .transpose()
    }

    fn relationship_property<K: PropertyKey>(
        &self,
        relationship: RelationshipId,
        key: K,
    ) -> GraphResult<Option<PropertyValue>> {
        let key = key.as_key();
        let row = self
            .connection()
            .query_row(
                "SELECT value_type, text_value, int_value
                 FROM relationship_properties
                 WHERE relationship_id = ?1 AND key = ?2;",
                params![relationship.get(), key],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                    ))
                },
            )
            .optional()?;
        row.map(|(value_type, text, int)| PropertyValue::from_columns(key, &value_type, text, int))
            .transpose()
    }

    fn relationship_properties(&self, relationship: RelationshipId) -> GraphResult<PropertyBag> {
        let mut stmt = self.connection().prepare(
            "SELECT key, value_type, text_value, int_value
             FROM relationship_properties
             WHERE relationship_id = ?1
             ORDER BY key ASC;",
        )?;
        let mut rows = stmt.query([relationship.get()])?;
        collect_property_rows(&mut rows)
    }

    /// Ids of every node, root included, in ascending order.
    fn node_ids(&self) -> GraphResult<Vec<NodeId>> {
        let mut stmt = self
            .connection()
            .prepare("SELECT id FROM nodes ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(NodeId::new(row.get(0)?));
        }
        Ok(ids)
    }

    fn node_count(&self) -> GraphResult<u64> {
        let count: i64 = self
            .connection()
            .query_row("SELECT COUNT(*) FROM nodes;", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn relationship_count(&self) -> GraphResult<u64> {
        let count: i64 =
            self.connection()
                .query_row("SELECT COUNT(*) FROM relationships;", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Starts a lazy traversal from `start`.
    fn traverse(&self, start: NodeId, description: TraversalDescription) -> Traverser<'_> {
        Traverser::new(self.connection(), start, description)
    }
}

/// Handle of one embedded graph store.
///
/// Single owner. `close` consumes the handle, and every derived wrapper
/// borrows it, so nothing can outlive the close.
pub struct GraphStore {
    conn: Connection,
    location: Option<PathBuf>,
}

impl GraphStore {
    /// Opens the store in directory `dir`, creating it on first use.
    pub fn open(dir: impl AsRef<Path>) -> GraphResult<Self> {
        Self::open_with_options(dir, &StoreOptions::default())
    }

    pub fn open_with_options(dir: impl AsRef<Path>, options: &StoreOptions) -> GraphResult<Self> {
        let dir = dir.as_ref();
        let conn = open_store_dir(dir, options)?;
        Ok(Self {
            conn,
            location: Some(dir.to_path_buf()),
        })
    }

    /// Opens a throwaway store that lives as long as the handle.
    pub fn open_in_memory() -> GraphResult<Self> {
        let conn = open_db_in_memory(&StoreOptions::default())?;
        Ok(Self {
            conn,
            location: None,
        })
    }

    /// Store directory, `None` for in-memory stores.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// Releases the store.
    pub fn close(self) -> GraphResult<()> {
        let location = self
            .location
            .as_ref()
            .map_or_else(|| "memory".to_string(), |path| path.display().to_string());
        self.conn.close().map_err(|(_, err)| GraphError::from(err))?;
        info!(
            "event=store_close module=graph status=ok location={}",
            location
        );
        Ok(())
    }

    /// Starts a transactional scope.
    ///
    /// The guard rolls back when dropped; call `commit` to persist.
    /// Transactions do not nest: opening a second one while the first is
    /// alive fails with a storage error.
    pub fn begin_transaction(&self) -> GraphResult<GraphTransaction<'_>> {
        let mut inner = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        inner.set_drop_behavior(DropBehavior::Rollback);
        Ok(GraphTransaction { inner, store: self })
    }

    /// Runs `op` in its own transaction, committing only when it returns
    /// `Ok`. Any error leaves the scope uncommitted and rolls it back.
    pub fn in_transaction<'s, T, E>(
        &'s self,
        op: impl FnOnce(&GraphTransaction<'s>) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<GraphError>,
    {
        let tx = self.begin_transaction()?;
        let value = op(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

impl GraphRead for GraphStore {
    fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Scoped transaction guard with default-to-rollback release.
pub struct GraphTransaction<'s> {
    inner: Transaction<'s>,
    store: &'s GraphStore,
}

impl<'s> GraphTransaction<'s> {
    /// The store this transaction belongs to.
    pub fn store(&self) -> &'s GraphStore {
        self.store
    }

    pub fn commit(self) -> GraphResult<()> {
        self.inner.commit()?;
        Ok(())
    }

    /// Discards every change made in this scope. Same as dropping the guard.
    pub fn rollback(self) -> GraphResult<()> {
        self.inner.rollback()?;
        Ok(())
    }

    /// Creates a node with a fresh id and an empty property bag.
    pub fn create_node(&self) -> GraphResult<NodeId> {
        self.inner.execute("INSERT INTO nodes DEFAULT VALUES;", [])?;
        Ok(NodeId::new(self.inner.last_insert_rowid()))
    }

    /// Deletes a node that no relationship references any more.
    ///
    /// # Errors
    /// - `GraphError::NodeNotFound` when the id is absent.
    /// - `GraphError::RootNodeProtected` for the global root.
    /// - `GraphError::NodeHasRelationships` while edges remain.
    pub fn delete_node(&self, id: NodeId) -> GraphResult<()> {
        if id.is_root() {
            return Err(GraphError::RootNodeProtected);
        }
        ensure_node_exists(&self.inner, id)?;

        let count: i64 = self.inner.query_row(
            "SELECT COUNT(*)
             FROM relationships
             WHERE start_node = ?1 OR end_node = ?1;",
            [id.get()],
            |row| row.get(0),
        )?;
        if count > 0 {
            return Err(GraphError::NodeHasRelationships {
                node: id,
                count: count as u64,
            });
        }

        self.inner
            .execute("DELETE FROM nodes WHERE id = ?1;", [id.get()])?;
        Ok(())
    }

    /// Creates the edge `start -[rel_type]-> end`.
    pub fn create_relationship(
        &self,
        start: NodeId,
        end: NodeId,
        rel_type: RelType,
    ) -> GraphResult<RelationshipId> {
        ensure_node_exists(&self.inner, start)?;
        ensure_node_exists(&self.inner, end)?;
        self.inner.execute(
            "INSERT INTO relationships (rel_type, start_node, end_node)
             VALUES (?1, ?2, ?3);",
            params![rel_type.as_db_str(), start.get(), end.get()],
        )?;
        Ok(RelationshipId::new(self.inner.last_insert_rowid()))
    }

    pub fn delete_relationship(&self, id: RelationshipId) -> GraphResult<()> {
        let changed = self
            .inner
            .execute("DELETE FROM relationships WHERE id = ?1;", [id.get()])?;
        if changed == 0 {
            return Err(GraphError::RelationshipNotFound(id));
        }
        Ok(())
    }

    pub fn set_node_property<K: PropertyKey>(
        &self,
        node: NodeId,
        key: K,
        value: &PropertyValue,
    ) -> GraphResult<()> {
        ensure_node_exists(&self.inner, node)?;
        let (text_value, int_value) = value.to_columns();
        self.inner.execute(
            "INSERT INTO node_properties (node_id, key, value_type, text_value, int_value)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (node_id, key) DO UPDATE SET
                value_type = excluded.value_type,
                text_value = excluded.text_value,
                int_value = excluded.int_value;",
            params![
                node.get(),
                key.as_key(),
                value.value_type(),
                text_value,
                int_value
            ],
        )?;
        Ok(())
    }

    /// Removes a node property. Returns whether the key was present.
    pub fn remove_node_property<K: PropertyKey>(&self, node: NodeId, key: K) -> GraphResult<bool> {
        ensure_node_exists(&self.inner, node)?;
        let changed = self.inner.execute(
            "DELETE FROM node_properties WHERE node_id = ?1 AND key = ?2;",
            params![node.get(), key.as_key()],
        )?;
        Ok(changed > 0)
    }

    pub fn set_relationship_property<K: PropertyKey>(
        &self,
        relationship: RelationshipId,
        key: K,
        value: &PropertyValue,
    ) -> GraphResult<()> {
        self.get_relationship_by_id(relationship)?;
        let (text_value, int_value) = value.to_columns();
        self.inner.execute(
            "INSERT INTO relationship_properties
                (relationship_id, key, value_type, text_value, int_value)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (relationship_id, key) DO UPDATE SET
                value_type = excluded.value_type,
                text_value = excluded.text_value,
                int_value = excluded.int_value;",
            params![
                relationship.get(),
                key.as_key(),
                value.value_type(),
                text_value,
                int_value
            ],
        )?;
        Ok(())
    }

    pub fn remove_relationship_property<K: PropertyKey>(
        &self,
        relationship: RelationshipId,
        key: K,
    ) -> GraphResult<bool> {
        self.get_relationship_by_id(relationship)?;
        let changed = self.inner.execute(
            "DELETE FROM relationship_properties WHERE relationship_id = ?1 AND key = ?2;",
            params![relationship.get(), key.as_key()],
        )?;
        Ok(changed > 0)
    }

    /// Deletes every relationship and every node except the global root.
    ///
    /// Unguarded bulk path: relationships go first, so no per-node
    /// relationship check is needed. Returns `(nodes, relationships)`
    /// deleted.
    pub fn clear_all(&self) -> GraphResult<(usize, usize)> {
        let relationships = self.inner.execute("DELETE FROM relationships;", [])?;
        self.inner.execute(
            "DELETE FROM node_properties WHERE node_id = ?1;",
            [ROOT_NODE_ID.get()],
        )?;
        let nodes = self
            .inner
            .execute("DELETE FROM nodes WHERE id <> ?1;", [ROOT_NODE_ID.get()])?;
        debug!(
            "event=graph_clear module=graph status=ok nodes={} relationships={}",
            nodes, relationships
        );
        Ok((nodes, relationships))
    }
}

impl GraphRead for GraphTransaction<'_> {
    fn connection(&self) -> &Connection {
        &self.inner
    }
}

pub(crate) fn load_relationships(
    conn: &Connection,
    node: NodeId,
    rel_type: Option<RelType>,
    direction: Direction,
) -> GraphResult<Vec<Relationship>> {
    let sql = match direction {
        Direction::Outgoing => {
            "SELECT id, rel_type, start_node, end_node
             FROM relationships
             WHERE start_node = ?1 AND (?2 IS NULL OR rel_type = ?2)
             ORDER BY id ASC;"
        }
        Direction::Incoming => {
            "SELECT id, rel_type, start_node, end_node
             FROM relationships
             WHERE end_node = ?1 AND (?2 IS NULL OR rel_type = ?2)
             ORDER BY id ASC;"
        }
        Direction::Both => {
            "SELECT id, rel_type, start_node, end_node
             FROM relationships
             WHERE (start_node = ?1 OR end_node = ?1) AND (?2 IS NULL OR rel_type = ?2)
             ORDER BY id ASC;"
        }
    };
    let mut stmt = conn.prepare_cached(sql)?;
    let mut rows = stmt.query(params![node.get(), rel_type.map(RelType::as_db_str)])?;
    let mut relationships = Vec::new();
    while let Some(row) = rows.next()? {
        relationships.push(parse_relationship_row(row)?);
    }
    Ok(relationships)
}

pub(crate) fn node_exists(conn: &Connection, id: NodeId) -> GraphResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM nodes WHERE id = ?1);",
        [id.get()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn ensure_node_exists(conn: &Connection, id: NodeId) -> GraphResult<()> {
    if node_exists(conn, id)? {
        Ok(())
    } else {
        Err(GraphError::NodeNotFound(id))
    }
}

fn load_node_properties(conn: &Connection, id: NodeId) -> GraphResult<PropertyBag> {
    let mut stmt = conn.prepare(
        "SELECT key, value_type, text_value, int_value
         FROM node_properties
         WHERE node_id = ?1
         ORDER BY key ASC;",
    )?;
    let mut rows = stmt.query([id.get()])?;
    collect_property_rows(&mut rows)
}

fn collect_property_rows(rows: &mut rusqlite::Rows<'_>) -> GraphResult<PropertyBag> {
    let mut bag = PropertyBag::new();
    while let Some(row) = rows.next()? {
        let key: String = row.get(0)?;
        let value_type: String = row.get(1)?;
        let value = PropertyValue::from_columns(&key, &value_type, row.get(2)?, row.get(3)?)?;
        bag.insert(key, value);
    }
    Ok(bag)
}

fn parse_relationship_row(row: &Row<'_>) -> GraphResult<Relationship> {
    let type_text: String = row.get("rel_type")?;
    let rel_type = RelType::parse(&type_text).ok_or_else(|| {
        GraphError::InvalidData(format!(
            "invalid relationship type `{type_text}` in relationships.rel_type"
        ))
    })?;
    Ok(Relationship {
        id: RelationshipId::new(row.get("id")?),
        rel_type,
        start: NodeId::new(row.get("start_node")?),
        end: NodeId::new(row.get("end_node")?),
    })
}
