//! Manager for natural-key indices
//!
//! Tracks which (label, property) pairs are indexed and keeps each index in
//! step with property writes.

use super::key_index::KeyIndex;
use crate::graph::{Label, NodeId, PropertyValue};
use std::collections::HashMap;

/// Key for identifying a key index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyIndexKey {
    pub label: Label,
    pub property: String,
}

impl KeyIndexKey {
    fn new(label: &Label, property: &str) -> Self {
        Self {
            label: label.clone(),
            property: property.to_string(),
        }
    }
}

/// All key indices of one store
#[derive(Debug, Clone, Default)]
pub struct IndexManager {
    indices: HashMap<KeyIndexKey, KeyIndex>,
}

impl IndexManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty index; returns false if it already existed
    pub fn create_index(&mut self, label: Label, property: String) -> bool {
        let key = KeyIndexKey { label, property };
        if self.indices.contains_key(&key) {
            return false;
        }
        self.indices.insert(key, KeyIndex::new());
        true
    }

    pub fn has_index(&self, label: &Label, property: &str) -> bool {
        self.indices.contains_key(&KeyIndexKey::new(label, property))
    }

    pub fn get_index(&self, label: &Label, property: &str) -> Option<&KeyIndex> {
        self.indices.get(&KeyIndexKey::new(label, property))
    }

    /// Indexed (label, property) pairs, sorted
    pub fn definitions(&self) -> Vec<(Label, String)> {
        let mut defs: Vec<(Label, String)> = self
            .indices
            .keys()
            .map(|k| (k.label.clone(), k.property.clone()))
            .collect();
        defs.sort();
        defs
    }

    /// Update indices when a property changes from `old` to `new`
    ///
    /// Only string values are indexed; any other value simply drops out of
    /// the index.
    pub fn on_property_change(
        &mut self,
        label: &Label,
        property: &str,
        old: Option<&PropertyValue>,
        new: Option<&PropertyValue>,
        node_id: NodeId,
    ) {
        let Some(index) = self.indices.get_mut(&KeyIndexKey::new(label, property)) else {
            return;
        };
        if let Some(PropertyValue::String(old)) = old {
            index.remove(old, node_id);
        }
        if let Some(PropertyValue::String(new)) = new {
            index.insert(new, node_id);
        }
    }
}
