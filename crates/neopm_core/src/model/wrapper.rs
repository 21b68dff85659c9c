//! Typed node wrapper: one graph node viewed as one domain entity.
//!
//! # Responsibility
//! - Validate the stored discriminant whenever a node is wrapped.
//! - Translate property bag primitives to semantic types.
//! - Scope edge creation, edge lookups and traversals to "this node".
//!
//! # Invariants
//! - The discriminant is written exactly once, by `create_in`.
//! - Optional fields are represented by key absence; writing `None`
//!   removes the key.
//! - Public setters each run in their own transaction; the `*_in` variants
//!   join a transaction the caller already holds.
//! - Public writes go through `NodeEntity::validate_property`; the raw
//!   writers on `NodeWrapper` stay inside the crate and never touch the
//!   discriminant key.
//! - Edges only link wrappers borrowed from the same store handle.

use crate::graph::{
    Direction, GraphError, GraphRead, GraphStore, GraphTransaction, NodeId, PropertyKey,
    PropertyValue, RelType, Relationship, RelationshipId, TraversalDescription, Traverser,
};
use crate::model::kind::KindKey;
use crate::model::{EntityKind, ModelError, ModelResult};
use chrono::{DateTime, Utc};
use log::warn;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

/// A domain entity backed by one node.
pub trait NodeEntity<'g>: Sized {
    /// Discriminant written on creation and checked on every load.
    const KIND: EntityKind;
    /// Closed set of property keys this entity may use.
    type Property: PropertyKey;

    fn from_wrapper(node: NodeWrapper<'g>) -> Self;

    fn wrapper(&self) -> &NodeWrapper<'g>;

    fn id(&self) -> NodeId {
        self.wrapper().id()
    }

    /// Wraps an existing node, failing with `TypeMismatch` when its
    /// discriminant is not `Self::KIND`.
    fn load(store: &'g GraphStore, id: NodeId) -> ModelResult<Self> {
        NodeWrapper::load(store, id, Self::KIND).map(Self::from_wrapper)
    }

    /// Checks a write of `value` to `key`, `None` meaning removal.
    ///
    /// # Errors
    /// - `ModelError::RequiredProperty` when removing a mandatory key.
    /// - `ModelError::PropertyType` for a value of the wrong type.
    /// - Entity rules such as `BlankName` or `NegativeDuration`.
    fn validate_property(key: Self::Property, value: Option<&PropertyValue>) -> ModelResult<()>;

    fn property(&self, key: Self::Property) -> ModelResult<Option<PropertyValue>> {
        self.wrapper().property(key)
    }

    fn set_property(&self, key: Self::Property, value: impl Into<PropertyValue>) -> ModelResult<()> {
        self.set_or_remove_property(key, Some(value.into()))
    }

    /// Stores `value`, or removes the key when `value` is `None`.
    fn set_or_remove_property(
        &self,
        key: Self::Property,
        value: Option<PropertyValue>,
    ) -> ModelResult<()> {
        Self::validate_property(key, value.as_ref())?;
        self.wrapper().set_or_remove_property(key, value)
    }

    /// Removes an optional property. Returns whether the key was present.
    fn remove_property(&self, key: Self::Property) -> ModelResult<bool> {
        Self::validate_property(key, None)?;
        self.wrapper().remove_property(key)
    }
}

/// Store handle plus node id plus checked entity kind.
#[derive(Clone, Copy)]
pub struct NodeWrapper<'g> {
    store: &'g GraphStore,
    id: NodeId,
    kind: EntityKind,
}

impl Debug for NodeWrapper<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeWrapper")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

impl PartialEq for NodeWrapper<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.store, other.store) && self.id == other.id
    }
}

impl Eq for NodeWrapper<'_> {}

impl<'g> NodeWrapper<'g> {
    /// Wraps node `id`, checking its discriminant against `expected`.
    ///
    /// # Errors
    /// - `GraphError::NodeNotFound` when the id is absent.
    /// - `ModelError::TypeMismatch` when the discriminant differs or is
    ///   missing.
    pub fn load(store: &'g GraphStore, id: NodeId, expected: EntityKind) -> ModelResult<Self> {
        check_kind(store, id, expected)?;
        Ok(Self {
            store,
            id,
            kind: expected,
        })
    }

    /// Creates a fresh node and stamps it with `kind`.
    pub(crate) fn create_in(tx: &GraphTransaction<'g>, kind: EntityKind) -> ModelResult<Self> {
        let id = tx.create_node()?;
        tx.set_node_property(id, KindKey, &PropertyValue::Text(kind.as_db_str().to_string()))?;
        Ok(Self {
            store: tx.store(),
            id,
            kind,
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn store(&self) -> &'g GraphStore {
        self.store
    }

    pub fn property<K: PropertyKey>(&self, key: K) -> ModelResult<Option<PropertyValue>> {
        Ok(self.store.node_property(self.id, key)?)
    }

    pub fn text_property<K: PropertyKey>(&self, key: K) -> ModelResult<Option<String>> {
        match self.property(key)? {
            None => Ok(None),
            Some(PropertyValue::Text(value)) => Ok(Some(value)),
            Some(other) => Err(self.unexpected_value(key, "text", &other)),
        }
    }

    pub fn integer_property<K: PropertyKey>(&self, key: K) -> ModelResult<Option<i64>> {
        match self.property(key)? {
            None => Ok(None),
            Some(PropertyValue::Integer(value)) => Ok(Some(value)),
            Some(other) => Err(self.unexpected_value(key, "integer", &other)),
        }
    }

    pub fn timestamp_property<K: PropertyKey>(&self, key: K) -> ModelResult<Option<DateTime<Utc>>> {
        match self.property(key)? {
            None => Ok(None),
            Some(PropertyValue::Timestamp(millis)) => {
                DateTime::from_timestamp_millis(millis).map(Some).ok_or_else(|| {
                    GraphError::InvalidData(format!(
                        "timestamp {millis} out of range in `{}` of node {}",
                        key.as_key(),
                        self.id
                    ))
                    .into()
                })
            }
            Some(other) => Err(self.unexpected_value(key, "timestamp", &other)),
        }
    }

    /// Text property that every entity of this kind must carry.
    pub fn required_text<K: PropertyKey>(&self, key: K) -> ModelResult<String> {
        self.text_property(key)?.ok_or_else(|| {
            GraphError::InvalidData(format!(
                "{} node {} is missing `{}`",
                self.kind,
                self.id,
                key.as_key()
            ))
            .into()
        })
    }

    pub(crate) fn set_or_remove_property<K: PropertyKey>(
        &self,
        key: K,
        value: Option<PropertyValue>,
    ) -> ModelResult<()> {
        self.store
            .in_transaction(|tx| self.write_property_in(tx, key, value))
    }

    pub(crate) fn remove_property<K: PropertyKey>(&self, key: K) -> ModelResult<bool> {
        ensure_not_reserved(key)?;
        self.store
            .in_transaction(|tx| Ok(tx.remove_node_property(self.id, key)?))
    }

    pub(crate) fn write_property_in<K: PropertyKey>(
        &self,
        tx: &GraphTransaction<'_>,
        key: K,
        value: Option<PropertyValue>,
    ) -> ModelResult<()> {
        ensure_not_reserved(key)?;
        match value {
            Some(value) => tx.set_node_property(self.id, key, &value)?,
            None => {
                tx.remove_node_property(self.id, key)?;
            }
        }
        Ok(())
    }

    /// Checks that `other` shares this wrapper's store handle and still
    /// carries its kind, reading through `tx`.
    ///
    /// # Errors
    /// - `ModelError::ForeignStore` when `other` was loaded from another
    ///   handle, even one opened on the same directory.
    pub(crate) fn check_peer_in(
        &self,
        tx: &GraphTransaction<'_>,
        other: &NodeWrapper<'_>,
    ) -> ModelResult<()> {
        if !std::ptr::eq(self.store, other.store) {
            warn!(
                "event=entity_link module=model status=error error_code=foreign_store node_id={} other_id={}",
                self.id, other.id
            );
            return Err(ModelError::ForeignStore(other.id));
        }
        check_kind(tx, other.id, other.kind)
    }

    /// Creates the edge `self -[rel_type]-> other`.
    pub(crate) fn create_edge_in(
        &self,
        tx: &GraphTransaction<'_>,
        other: NodeId,
        rel_type: RelType,
    ) -> ModelResult<RelationshipId> {
        Ok(tx.create_relationship(self.id, other, rel_type)?)
    }

    pub fn has_edge(&self, rel_type: RelType, direction: Direction) -> ModelResult<bool> {
        Ok(self.store.has_relationship(self.id, rel_type, direction)?)
    }

    /// The only matching edge, if any.
    ///
    /// # Errors
    /// - `GraphError::MultipleRelationships` when more than one matches.
    pub fn single_edge(
        &self,
        rel_type: RelType,
        direction: Direction,
    ) -> ModelResult<Option<Relationship>> {
        Ok(self.store.single_relationship(self.id, rel_type, direction)?)
    }

    pub fn traverse_from(&self, description: TraversalDescription) -> Traverser<'g> {
        self.store.traverse(self.id, description)
    }

    /// One-hop neighbours along `rel_type`, wrapped as `E`.
    pub fn neighbors<E: NodeEntity<'g>>(
        &self,
        rel_type: RelType,
        direction: Direction,
    ) -> TypedNodes<'g, E> {
        TypedNodes::new(
            self.store,
            self.traverse_from(TraversalDescription::one_hop(rel_type, direction)),
        )
    }

    fn unexpected_value<K: PropertyKey>(
        &self,
        key: K,
        expected: &str,
        found: &PropertyValue,
    ) -> ModelError {
        GraphError::InvalidData(format!(
            "property `{}` of node {} should be {expected}, found {}",
            key.as_key(),
            self.id,
            found.value_type()
        ))
        .into()
    }
}

/// Lazy sequence of typed wrappers over a traversal.
///
/// Each yielded node is loaded with its discriminant checked.
pub struct TypedNodes<'g, E> {
    store: &'g GraphStore,
    inner: Traverser<'g>,
    _entity: PhantomData<E>,
}

impl<'g, E: NodeEntity<'g>> TypedNodes<'g, E> {
    pub fn new(store: &'g GraphStore, inner: Traverser<'g>) -> Self {
        Self {
            store,
            inner,
            _entity: PhantomData,
        }
    }
}

impl<'g, E: NodeEntity<'g>> Iterator for TypedNodes<'g, E> {
    type Item = ModelResult<E>;

    fn next(&mut self) -> Option<Self::Item> {
        let store = self.store;
        self.inner
            .next()
            .map(|id| id.map_err(ModelError::from).and_then(|id| E::load(store, id)))
    }
}

fn ensure_not_reserved<K: PropertyKey>(key: K) -> ModelResult<()> {
    if key.as_key() == KindKey.as_key() {
        return Err(ModelError::ReservedProperty(key.as_key()));
    }
    Ok(())
}

fn check_kind<G: GraphRead>(graph: &G, id: NodeId, expected: EntityKind) -> ModelResult<()> {
    if !graph.node_exists(id)? {
        return Err(GraphError::NodeNotFound(id).into());
    }

    let found = match graph.node_property(id, KindKey)? {
        None => None,
        Some(PropertyValue::Text(text)) => Some(EntityKind::parse(&text).ok_or_else(|| {
            GraphError::InvalidData(format!("invalid entity kind `{text}` on node {id}"))
        })?),
        Some(other) => {
            return Err(GraphError::InvalidData(format!(
                "entity kind of node {id} stored as {}",
                other.value_type()
            ))
            .into());
        }
    };

    if found != Some(expected) {
        warn!(
            "event=entity_wrap module=model status=error error_code=type_mismatch node_id={} expected={} found={}",
            id,
            expected,
            found.map_or("none", EntityKind::as_db_str)
        );
        return Err(ModelError::TypeMismatch {
            node: id,
            expected,
            found,
        });
    }
    Ok(())
}
