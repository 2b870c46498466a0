//! Transactional store seam
//!
//! The ingestion engine only talks to a graph through [`GraphDatabase`] and
//! [`GraphTransaction`]. [`MemoryGraph`] is the bundled implementation:
//! optimistic snapshot isolation over an in-memory [`GraphStore`]. `begin`
//! shares the committed store and records writes in a journal, and `commit`
//! publishes the journal only if no other transaction committed in between,
//! so two concurrent writers can never both create a node for the same key.

use super::edge::Edge;
use super::journal::Journal;
use super::node::Node;
use super::property::PropertyValue;
use super::store::{GraphStatistics, GraphStore, StoreError, StoreResult};
use super::types::{EdgeId, EdgeType, Label, NodeId};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// One unit of work against a property graph
///
/// Dropping a transaction without calling [`commit`](Self::commit) discards
/// every change made through it.
pub trait GraphTransaction {
    /// Find a node by exact match on a string key property
    fn find_node(&self, label: &Label, key: &str, value: &str) -> StoreResult<Option<NodeId>>;

    /// Create a node with no properties
    fn create_node(&mut self, label: &Label) -> StoreResult<NodeId>;

    /// Snapshot of a node as seen by this transaction
    fn node(&self, id: NodeId) -> StoreResult<Node>;

    fn node_property(&self, id: NodeId, key: &str) -> StoreResult<Option<PropertyValue>>;

    fn set_node_property(&mut self, id: NodeId, key: &str, value: PropertyValue) -> StoreResult<()>;

    fn remove_node_property(&mut self, id: NodeId, key: &str) -> StoreResult<()>;

    /// Create a directed edge; never checks for an existing one
    fn create_edge(&mut self, source: NodeId, target: NodeId, edge_type: &EdgeType) -> StoreResult<EdgeId>;

    fn set_edge_property(&mut self, id: EdgeId, key: &str, value: PropertyValue) -> StoreResult<()>;

    /// Outgoing edges of `node` with the given type, in creation order
    fn outgoing_edges(&self, node: NodeId, edge_type: &EdgeType) -> StoreResult<Vec<Edge>>;

    /// Every node with `label`, in creation order
    fn nodes_by_label(&self, label: &Label) -> StoreResult<Vec<NodeId>>;

    fn commit(self) -> StoreResult<()>
    where
        Self: Sized;

    fn rollback(self)
    where
        Self: Sized;
}

/// A graph that hands out transactions
pub trait GraphDatabase {
    type Transaction: GraphTransaction;

    fn begin(&self) -> StoreResult<Self::Transaction>;
}

#[derive(Debug, Default)]
struct Committed {
    store: Arc<GraphStore>,
    version: u64,
}

/// Shared in-memory graph with optimistic transactions
///
/// Cloning shares the same underlying graph. A graph built with `new` has no
/// key indices, so natural-key lookups scan the label.
#[derive(Debug, Clone, Default)]
pub struct MemoryGraph {
    shared: Arc<RwLock<Committed>>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing store, e.g. one loaded from a snapshot
    pub fn with_store(store: GraphStore) -> Self {
        Self {
            shared: Arc::new(RwLock::new(Committed {
                store: Arc::new(store),
                version: 0,
            })),
        }
    }

    /// Copy of the committed graph
    pub fn snapshot(&self) -> StoreResult<GraphStore> {
        let committed = self.shared.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(GraphStore::clone(&committed.store))
    }

    /// Number of commits that changed the graph
    pub fn version(&self) -> StoreResult<u64> {
        let committed = self.shared.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(committed.version)
    }

    pub fn statistics(&self) -> StoreResult<GraphStatistics> {
        let committed = self.shared.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(committed.store.statistics())
    }
}

impl GraphDatabase for MemoryGraph {
    type Transaction = MemoryTransaction;

    fn begin(&self) -> StoreResult<MemoryTransaction> {
        let committed = self.shared.read().map_err(|_| StoreError::LockPoisoned)?;
        let base = Arc::clone(&committed.store);
        Ok(MemoryTransaction {
            shared: Arc::clone(&self.shared),
            base_version: committed.version,
            journal: Journal::new(&base),
            base,
        })
    }
}

/// Transaction over a [`MemoryGraph`]
///
/// Reads go through the transaction's [`Journal`] to the committed store it
/// started from; writes only ever touch the journal.
#[derive(Debug)]
pub struct MemoryTransaction {
    shared: Arc<RwLock<Committed>>,
    base_version: u64,
    base: Arc<GraphStore>,
    journal: Journal,
}

impl GraphTransaction for MemoryTransaction {
    fn find_node(&self, label: &Label, key: &str, value: &str) -> StoreResult<Option<NodeId>> {
        Ok(self.journal.find_node(&self.base, label, key, value))
    }

    fn create_node(&mut self, label: &Label) -> StoreResult<NodeId> {
        Ok(self.journal.create_node(label))
    }

    fn node(&self, id: NodeId) -> StoreResult<Node> {
        self.journal
            .node(&self.base, id)
            .cloned()
            .ok_or(StoreError::NodeNotFound(id))
    }

    fn node_property(&self, id: NodeId, key: &str) -> StoreResult<Option<PropertyValue>> {
        let node = self.journal.node(&self.base, id).ok_or(StoreError::NodeNotFound(id))?;
        Ok(node.get_property(key).cloned())
    }

    fn set_node_property(&mut self, id: NodeId, key: &str, value: PropertyValue) -> StoreResult<()> {
        self.journal.set_node_property(&self.base, id, key, value)
    }

    fn remove_node_property(&mut self, id: NodeId, key: &str) -> StoreResult<()> {
        self.journal.remove_node_property(&self.base, id, key)
    }

    fn create_edge(&mut self, source: NodeId, target: NodeId, edge_type: &EdgeType) -> StoreResult<EdgeId> {
        self.journal.create_edge(&self.base, source, target, edge_type)
    }

    fn set_edge_property(&mut self, id: EdgeId, key: &str, value: PropertyValue) -> StoreResult<()> {
        self.journal.set_edge_property(&self.base, id, key, value)
    }

    fn outgoing_edges(&self, node: NodeId, edge_type: &EdgeType) -> StoreResult<Vec<Edge>> {
        if self.journal.node(&self.base, node).is_none() {
            return Err(StoreError::NodeNotFound(node));
        }
        Ok(self.journal.outgoing_edges(&self.base, node, edge_type))
    }

    fn nodes_by_label(&self, label: &Label) -> StoreResult<Vec<NodeId>> {
        Ok(self.journal.nodes_by_label(&self.base, label))
    }

    fn commit(self) -> StoreResult<()> {
        let MemoryTransaction {
            shared,
            base_version,
            base,
            journal,
        } = self;
        if journal.is_empty() {
            return Ok(());
        }
        // Release our read view so an unshared store is updated in place
        drop(base);

        let mut committed = shared.write().map_err(|_| StoreError::LockPoisoned)?;
        if committed.version != base_version {
            return Err(StoreError::Conflict {
                expected: base_version,
                actual: committed.version,
            });
        }
        journal.publish(Arc::make_mut(&mut committed.store))?;
        committed.version += 1;
        debug!("committed graph version {}", committed.version);
        Ok(())
    }

    fn rollback(self) {
        if !self.journal.is_empty() {
            debug!("rolled back transaction based on version {}", self.base_version);
        }
    }
}
