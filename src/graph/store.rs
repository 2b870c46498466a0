//! In-memory graph storage
//!
//! Append-only arena of nodes and edges with adjacency lists, a label
//! index, an edge type index and optional natural-key indices. Nothing is
//! ever deleted, so an id is its slot in the arena.

use super::edge::Edge;
use super::node::Node;
use super::property::PropertyValue;
use super::types::{EdgeId, EdgeType, Label, NodeId};
use crate::index::IndexManager;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Errors raised at the store boundary
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Edge {0} not found")]
    EdgeNotFound(EdgeId),

    #[error("Invalid edge: source node {0} does not exist")]
    InvalidEdgeSource(NodeId),

    #[error("Invalid edge: target node {0} does not exist")]
    InvalidEdgeTarget(NodeId),

    #[error("Write conflict: graph moved from version {expected} to {actual} during the transaction")]
    Conflict { expected: u64, actual: u64 },

    #[error("Graph lock poisoned")]
    LockPoisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Per-label and per-type counts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphStatistics {
    pub node_count: usize,
    pub edge_count: usize,
    pub label_counts: Vec<(Label, usize)>,
    pub edge_type_counts: Vec<(EdgeType, usize)>,
}

/// In-memory graph storage
///
/// - nodes: slot `id - 1` holds node `id`
/// - edges: slot `id - 1` holds edge `id`
/// - outgoing / incoming: adjacency lists per node slot
/// - label_index: Label -> nodes in creation order
/// - edge_type_index: EdgeType -> edges in creation order
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    outgoing: Vec<Vec<EdgeId>>,
    incoming: Vec<Vec<EdgeId>>,
    label_index: HashMap<Label, Vec<NodeId>>,
    edge_type_index: HashMap<EdgeType, Vec<EdgeId>>,
    key_index: IndexManager,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        Self::default()
    }

    fn node_slot(id: NodeId) -> Option<usize> {
        (id.as_u64() as usize).checked_sub(1)
    }

    fn edge_slot(id: EdgeId) -> Option<usize> {
        (id.as_u64() as usize).checked_sub(1)
    }

    /// Create a node with the next free id and no properties
    pub fn create_node(&mut self, label: impl Into<Label>) -> NodeId {
        let node_id = NodeId::new(self.nodes.len() as u64 + 1);
        let label = label.into();

        self.label_index.entry(label.clone()).or_default().push(node_id);
        self.nodes.push(Node::new(node_id, label));
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());

        debug!("created node {}", node_id);
        node_id
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        Self::node_slot(id).and_then(|slot| self.nodes.get(slot))
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.get_node(id).is_some()
    }

    /// Set a property on a node, keeping key indices in step
    pub fn set_node_property(
        &mut self,
        node_id: NodeId,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> StoreResult<()> {
        let key = key.into();
        let value = value.into();
        let node = Self::node_slot(node_id)
            .and_then(|slot| self.nodes.get_mut(slot))
            .ok_or(StoreError::NodeNotFound(node_id))?;

        let old = node.set_property(key.clone(), value.clone());
        self.key_index
            .on_property_change(&node.label, &key, old.as_ref(), Some(&value), node_id);
        Ok(())
    }

    /// Remove a property from a node; a missing property is not an error
    pub fn remove_node_property(&mut self, node_id: NodeId, key: &str) -> StoreResult<Option<PropertyValue>> {
        let node = Self::node_slot(node_id)
            .and_then(|slot| self.nodes.get_mut(slot))
            .ok_or(StoreError::NodeNotFound(node_id))?;

        let old = node.remove_property(key);
        if old.is_some() {
            self.key_index
                .on_property_change(&node.label, key, old.as_ref(), None, node_id);
        }
        Ok(old)
    }

    /// Create a directed edge between two existing nodes
    ///
    /// Parallel edges are allowed here; duplicate suppression belongs to the
    /// caller.
    pub fn create_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: impl Into<EdgeType>,
    ) -> StoreResult<EdgeId> {
        if !self.has_node(source) {
            return Err(StoreError::InvalidEdgeSource(source));
        }
        if !self.has_node(target) {
            return Err(StoreError::InvalidEdgeTarget(target));
        }

        let edge_id = EdgeId::new(self.edges.len() as u64 + 1);
        let edge_type = edge_type.into();

        self.outgoing[source.as_u64() as usize - 1].push(edge_id);
        self.incoming[target.as_u64() as usize - 1].push(edge_id);
        self.edge_type_index.entry(edge_type.clone()).or_default().push(edge_id);
        self.edges.push(Edge::new(edge_id, source, target, edge_type));

        debug!("created edge {} {} -> {}", edge_id, source, target);
        Ok(edge_id)
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        Self::edge_slot(id).and_then(|slot| self.edges.get(slot))
    }

    pub fn set_edge_property(
        &mut self,
        edge_id: EdgeId,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> StoreResult<()> {
        let edge = Self::edge_slot(edge_id)
            .and_then(|slot| self.edges.get_mut(slot))
            .ok_or(StoreError::EdgeNotFound(edge_id))?;
        edge.set_property(key, value);
        Ok(())
    }

    /// Get all outgoing edges from a node
    pub fn get_outgoing_edges(&self, node_id: NodeId) -> Vec<&Edge> {
        Self::node_slot(node_id)
            .and_then(|slot| self.outgoing.get(slot))
            .map(|edge_ids| edge_ids.iter().filter_map(|&id| self.get_edge(id)).collect())
            .unwrap_or_default()
    }

    /// Get all incoming edges to a node
    pub fn get_incoming_edges(&self, node_id: NodeId) -> Vec<&Edge> {
        Self::node_slot(node_id)
            .and_then(|slot| self.incoming.get(slot))
            .map(|edge_ids| edge_ids.iter().filter_map(|&id| self.get_edge(id)).collect())
            .unwrap_or_default()
    }

    /// Nodes with a label, in creation order
    pub fn get_nodes_by_label(&self, label: &Label) -> Vec<&Node> {
        self.label_index
            .get(label)
            .map(|ids| ids.iter().filter_map(|&id| self.get_node(id)).collect())
            .unwrap_or_default()
    }

    /// Edges of a type, in creation order
    pub fn get_edges_by_type(&self, edge_type: &EdgeType) -> Vec<&Edge> {
        self.edge_type_index
            .get(edge_type)
            .map(|ids| ids.iter().filter_map(|&id| self.get_edge(id)).collect())
            .unwrap_or_default()
    }

    /// Find the oldest node with `label` whose string property `key` equals `value`
    ///
    /// Served from a key index when one exists for (label, key), otherwise by
    /// scanning the label.
    pub fn find_node(&self, label: &Label, key: &str, value: &str) -> Option<NodeId> {
        if let Some(index) = self.key_index.get_index(label, key) {
            return index.first(value);
        }
        self.label_index.get(label)?.iter().copied().find(|&id| {
            self.get_node(id)
                .and_then(|node| node.get_property(key))
                .and_then(|v| v.as_string())
                == Some(value)
        })
    }

    /// Every node with `label` whose string property `key` equals `value`,
    /// oldest first
    pub fn find_nodes(&self, label: &Label, key: &str, value: &str) -> Vec<NodeId> {
        if let Some(index) = self.key_index.get_index(label, key) {
            return index.get(value);
        }
        self.label_index
            .get(label)
            .map(|ids| {
                ids.iter()
                    .copied()
                    .filter(|&id| {
                        self.get_node(id)
                            .and_then(|node| node.get_property(key))
                            .and_then(|v| v.as_string())
                            == Some(value)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Index (label, key) for `find_node`, backfilling existing nodes
    pub fn create_key_index(&mut self, label: impl Into<Label>, key: impl Into<String>) {
        let label = label.into();
        let key = key.into();
        if !self.key_index.create_index(label.clone(), key.clone()) {
            return;
        }
        let ids = self.label_index.get(&label).cloned().unwrap_or_default();
        for id in ids {
            if let Some(value) = self.get_node(id).and_then(|n| n.get_property(&key)).cloned() {
                self.key_index.on_property_change(&label, &key, None, Some(&value), id);
            }
        }
    }

    pub fn has_key_index(&self, label: &Label, key: &str) -> bool {
        self.key_index.has_index(label, key)
    }

    pub fn key_index_definitions(&self) -> Vec<(Label, String)> {
        self.key_index.definitions()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Counts per label and per edge type, sorted by name
    pub fn statistics(&self) -> GraphStatistics {
        let mut label_counts: Vec<(Label, usize)> = self
            .label_index
            .iter()
            .map(|(label, ids)| (label.clone(), ids.len()))
            .collect();
        label_counts.sort();

        let mut edge_type_counts: Vec<(EdgeType, usize)> = self
            .edge_type_index
            .iter()
            .map(|(edge_type, ids)| (edge_type.clone(), ids.len()))
            .collect();
        edge_type_counts.sort();

        GraphStatistics {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            label_counts,
            edge_type_counts,
        }
    }

    // ============================================================
    // Bulk methods - snapshot recovery and transaction publishing
    // ============================================================

    /// Swap in a new version of an existing node, re-indexing changed keys
    pub fn replace_node(&mut self, node: Node) -> StoreResult<()> {
        let slot = Self::node_slot(node.id)
            .filter(|&slot| slot < self.nodes.len())
            .ok_or(StoreError::NodeNotFound(node.id))?;
        let old = std::mem::replace(&mut self.nodes[slot], node);
        let current = &self.nodes[slot];

        for (key, value) in &old.properties {
            let new = current.get_property(key);
            if new != Some(value) {
                self.key_index
                    .on_property_change(&current.label, key, Some(value), new, current.id);
            }
        }
        for (key, value) in &current.properties {
            if !old.properties.contains_key(key) {
                self.key_index
                    .on_property_change(&current.label, key, None, Some(value), current.id);
            }
        }
        Ok(())
    }

    /// Swap in a new version of an existing edge; endpoints must not change
    pub fn replace_edge(&mut self, edge: Edge) -> StoreResult<()> {
        let slot = Self::edge_slot(edge.id)
            .filter(|&slot| slot < self.edges.len())
            .ok_or(StoreError::EdgeNotFound(edge.id))?;
        let existing = &self.edges[slot];
        if existing.source != edge.source || existing.target != edge.target {
            return Err(StoreError::EdgeNotFound(edge.id));
        }
        self.edges[slot] = edge;
        Ok(())
    }

    /// Insert a recovered node, preserving its id
    ///
    /// Nodes must arrive in id order with no gaps.
    pub fn insert_recovered_node(&mut self, node: Node) -> StoreResult<()> {
        let expected = NodeId::new(self.nodes.len() as u64 + 1);
        if node.id != expected {
            return Err(StoreError::NodeNotFound(expected));
        }
        self.label_index.entry(node.label.clone()).or_default().push(node.id);
        for (key, value) in &node.properties {
            self.key_index.on_property_change(&node.label, key, None, Some(value), node.id);
        }
        self.nodes.push(node);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        Ok(())
    }

    /// Insert a recovered edge, preserving its id
    ///
    /// Edges must arrive in id order and their endpoints must already exist.
    pub fn insert_recovered_edge(&mut self, edge: Edge) -> StoreResult<()> {
        let expected = EdgeId::new(self.edges.len() as u64 + 1);
        if edge.id != expected {
            return Err(StoreError::EdgeNotFound(expected));
        }
        if !self.has_node(edge.source) {
            return Err(StoreError::InvalidEdgeSource(edge.source));
        }
        if !self.has_node(edge.target) {
            return Err(StoreError::InvalidEdgeTarget(edge.target));
        }

        self.outgoing[edge.source.as_u64() as usize - 1].push(edge.id);
        self.incoming[edge.target.as_u64() as usize - 1].push(edge.id);
        self.edge_type_index.entry(edge.edge_type.clone()).or_default().push(edge.id);
        self.edges.push(edge);
        Ok(())
    }
}
