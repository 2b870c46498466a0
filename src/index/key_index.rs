//! Exact-match index over a string key property

use crate::graph::NodeId;
use std::collections::{BTreeSet, HashMap};

/// Index for one (label, key property) pair
///
/// Value -> nodes holding that value. The set is ordered so that a lookup
/// always returns the oldest node first.
#[derive(Debug, Clone, Default)]
pub struct KeyIndex {
    index: HashMap<String, BTreeSet<NodeId>>,
}

impl KeyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: &str, node_id: NodeId) {
        self.index.entry(value.to_string()).or_default().insert(node_id);
    }

    pub fn remove(&mut self, value: &str, node_id: NodeId) {
        if let Some(nodes) = self.index.get_mut(value) {
            nodes.remove(&node_id);
            if nodes.is_empty() {
                self.index.remove(value);
            }
        }
    }

    /// First node holding `value`
    pub fn first(&self, value: &str) -> Option<NodeId> {
        self.index.get(value).and_then(|nodes| nodes.iter().next().copied())
    }

    pub fn get(&self, value: &str) -> Vec<NodeId> {
        self.index
            .get(value)
            .map(|nodes| nodes.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of distinct values
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
