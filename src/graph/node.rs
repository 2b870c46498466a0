//! Node implementation for the property graph

use super::property::{PropertyMap, PropertyValue};
use super::types::{Label, NodeId};
use serde::{Deserialize, Serialize};

/// A node in the property graph
///
/// Every node carries exactly one label, which names its record kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node
    pub id: NodeId,

    /// Record kind of this node
    pub label: Label,

    /// Properties associated with this node
    pub properties: PropertyMap,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl Node {
    /// Create a new node with no properties
    pub fn new(id: NodeId, label: impl Into<Label>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Node {
            id,
            label: label.into(),
            properties: PropertyMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_label(&self, label: &Label) -> bool {
        &self.label == label
    }

    /// Set a property value, returning the previous one
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Option<PropertyValue> {
        let old = self.properties.insert(key.into(), value.into());
        self.touch();
        old
    }

    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Remove a property
    ///
    /// Uses `shift_remove` so the remaining properties keep their order.
    pub fn remove_property(&mut self, key: &str) -> Option<PropertyValue> {
        let removed = self.properties.shift_remove(key);
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}
