//! Uncommitted writes of one transaction
//!
//! A [`Journal`] sits on top of a shared, read-only [`GraphStore`] and holds
//! only what the transaction changed: nodes and edges it created, private
//! copies of existing nodes and edges whose properties it wrote, and enough
//! indexing to answer key lookups and adjacency over the combined view.
//! Publishing it onto the store it was based on appends the created items
//! and swaps in the changed ones, so a transaction costs the size of its
//! writes, not the size of the graph.

use super::edge::Edge;
use super::node::Node;
use super::property::PropertyValue;
use super::store::{GraphStore, StoreError, StoreResult};
use super::types::{EdgeId, EdgeType, Label, NodeId};
use crate::index::KeyIndex;
use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
pub struct Journal {
    /// Node and edge counts of the base store when the journal started
    node_base: u64,
    edge_base: u64,
    created_nodes: Vec<Node>,
    created_edges: Vec<Edge>,
    touched_nodes: FxHashMap<NodeId, Node>,
    touched_edges: FxHashMap<EdgeId, Edge>,
    /// Created edges by source node
    outgoing: FxHashMap<NodeId, Vec<EdgeId>>,
    /// Created nodes by label
    labels: FxHashMap<Label, Vec<NodeId>>,
    /// String properties written to journal nodes, per (label, key)
    keys: FxHashMap<(Label, String), KeyIndex>,
}

impl Journal {
    pub fn new(base: &GraphStore) -> Self {
        Self {
            node_base: base.node_count() as u64,
            edge_base: base.edge_count() as u64,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.created_nodes.is_empty()
            && self.created_edges.is_empty()
            && self.touched_nodes.is_empty()
            && self.touched_edges.is_empty()
    }

    fn created_node_slot(&self, id: NodeId) -> Option<usize> {
        id.as_u64().checked_sub(self.node_base + 1).map(|slot| slot as usize)
    }

    fn created_edge_slot(&self, id: EdgeId) -> Option<usize> {
        id.as_u64().checked_sub(self.edge_base + 1).map(|slot| slot as usize)
    }

    // ============================================================
    // Reads: the journal wins over the base store
    // ============================================================

    pub fn node<'a>(&'a self, base: &'a GraphStore, id: NodeId) -> Option<&'a Node> {
        match self.created_node_slot(id) {
            Some(slot) => self.created_nodes.get(slot),
            None => self.touched_nodes.get(&id).or_else(|| base.get_node(id)),
        }
    }

    pub fn edge<'a>(&'a self, base: &'a GraphStore, id: EdgeId) -> Option<&'a Edge> {
        match self.created_edge_slot(id) {
            Some(slot) => self.created_edges.get(slot),
            None => self.touched_edges.get(&id).or_else(|| base.get_edge(id)),
        }
    }

    /// Oldest node of `label` whose string property `key` equals `value`
    pub fn find_node(&self, base: &GraphStore, label: &Label, key: &str, value: &str) -> Option<NodeId> {
        // A base match only counts if this journal did not rewrite the key
        let from_base = base.find_nodes(label, key, value).into_iter().find(|id| {
            match self.touched_nodes.get(id) {
                Some(node) => node.get_property(key).and_then(|v| v.as_string()) == Some(value),
                None => true,
            }
        });
        let from_journal = self
            .keys
            .get(&(label.clone(), key.to_string()))
            .and_then(|index| index.first(value));

        match (from_base, from_journal) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn outgoing_edges(&self, base: &GraphStore, node: NodeId, edge_type: &EdgeType) -> Vec<Edge> {
        let existing = base
            .get_outgoing_edges(node)
            .into_iter()
            .map(|edge| self.touched_edges.get(&edge.id).unwrap_or(edge));
        let created = self
            .outgoing
            .get(&node)
            .into_iter()
            .flatten()
            .filter_map(|&id| self.edge(base, id));

        existing
            .chain(created)
            .filter(|edge| &edge.edge_type == edge_type)
            .cloned()
            .collect()
    }

    pub fn nodes_by_label(&self, base: &GraphStore, label: &Label) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = base.get_nodes_by_label(label).iter().map(|n| n.id).collect();
        if let Some(created) = self.labels.get(label) {
            ids.extend_from_slice(created);
        }
        ids
    }

    // ============================================================
    // Writes
    // ============================================================

    pub fn create_node(&mut self, label: &Label) -> NodeId {
        let id = NodeId::new(self.node_base + self.created_nodes.len() as u64 + 1);
        self.labels.entry(label.clone()).or_default().push(id);
        self.created_nodes.push(Node::new(id, label.clone()));
        id
    }

    /// Writable copy of a node, taken from the base store on first write
    fn node_mut(&mut self, base: &GraphStore, id: NodeId) -> StoreResult<&mut Node> {
        if let Some(slot) = self.created_node_slot(id) {
            return self.created_nodes.get_mut(slot).ok_or(StoreError::NodeNotFound(id));
        }
        if !self.touched_nodes.contains_key(&id) {
            let node = base.get_node(id).ok_or(StoreError::NodeNotFound(id))?;
            self.touched_nodes.insert(id, node.clone());
        }
        self.touched_nodes.get_mut(&id).ok_or(StoreError::NodeNotFound(id))
    }

    pub fn set_node_property(
        &mut self,
        base: &GraphStore,
        id: NodeId,
        key: &str,
        value: PropertyValue,
    ) -> StoreResult<()> {
        let node = self.node_mut(base, id)?;
        let label = node.label.clone();
        let old = node.set_property(key, value.clone());
        self.reindex(label, key, old.as_ref(), Some(&value), id);
        Ok(())
    }

    pub fn remove_node_property(&mut self, base: &GraphStore, id: NodeId, key: &str) -> StoreResult<()> {
        let node = self.node_mut(base, id)?;
        let label = node.label.clone();
        if let Some(old) = node.remove_property(key) {
            self.reindex(label, key, Some(&old), None, id);
        }
        Ok(())
    }

    fn reindex(&mut self, label: Label, key: &str, old: Option<&PropertyValue>, new: Option<&PropertyValue>, id: NodeId) {
        let index = self.keys.entry((label, key.to_string())).or_default();
        if let Some(PropertyValue::String(old)) = old {
            index.remove(old, id);
        }
        if let Some(PropertyValue::String(new)) = new {
            index.insert(new, id);
        }
    }

    pub fn create_edge(
        &mut self,
        base: &GraphStore,
        source: NodeId,
        target: NodeId,
        edge_type: &EdgeType,
    ) -> StoreResult<EdgeId> {
        if self.node(base, source).is_none() {
            return Err(StoreError::InvalidEdgeSource(source));
        }
        if self.node(base, target).is_none() {
            return Err(StoreError::InvalidEdgeTarget(target));
        }
        let id = EdgeId::new(self.edge_base + self.created_edges.len() as u64 + 1);
        self.outgoing.entry(source).or_default().push(id);
        self.created_edges.push(Edge::new(id, source, target, edge_type.clone()));
        Ok(id)
    }

    pub fn set_edge_property(
        &mut self,
        base: &GraphStore,
        id: EdgeId,
        key: &str,
        value: PropertyValue,
    ) -> StoreResult<()> {
        let edge = match self.created_edge_slot(id) {
            Some(slot) => self.created_edges.get_mut(slot),
            None => {
                if !self.touched_edges.contains_key(&id) {
                    let edge = base.get_edge(id).ok_or(StoreError::EdgeNotFound(id))?;
                    self.touched_edges.insert(id, edge.clone());
                }
                self.touched_edges.get_mut(&id)
            }
        };
        edge.ok_or(StoreError::EdgeNotFound(id))?.set_property(key, value);
        Ok(())
    }

    /// Apply every write to `store`, which must be the store this journal
    /// was started on
    pub fn publish(self, store: &mut GraphStore) -> StoreResult<()> {
        if store.node_count() as u64 != self.node_base || store.edge_count() as u64 != self.edge_base {
            return Err(StoreError::Conflict {
                expected: self.node_base,
                actual: store.node_count() as u64,
            });
        }
        for node in self.touched_nodes.into_values() {
            store.replace_node(node)?;
        }
        for node in self.created_nodes {
            store.insert_recovered_node(node)?;
        }
        for edge in self.touched_edges.into_values() {
            store.replace_edge(edge)?;
        }
        for edge in self.created_edges {
            store.insert_recovered_edge(edge)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> GraphStore {
        let mut store = GraphStore::new();
        store.create_key_index("Entity", "name");
        let army = store.create_node("Entity");
        store.set_node_property(army, "name", "United States Army").unwrap();
        let dod = store.create_node("Entity");
        store.set_node_property(dod, "name", "Department of Defense").unwrap();
        store.create_edge(army, dod, "CHILD_OF").unwrap();
        store
    }

    #[test]
    fn test_reads_see_own_writes_only() {
        let base = base();
        let mut journal = Journal::new(&base);
        let label = Label::new("Entity");

        let guard = journal.create_node(&label);
        assert_eq!(guard, NodeId::new(3));
        journal
            .set_node_property(&base, guard, "name", "Army National Guard".into())
            .unwrap();

        assert_eq!(journal.find_node(&base, &label, "name", "Army National Guard"), Some(guard));
        assert_eq!(journal.nodes_by_label(&base, &label).len(), 3);
        assert_eq!(base.find_node(&label, "name", "Army National Guard"), None);
        assert_eq!(base.node_count(), 2);
    }

    #[test]
    fn test_rewritten_base_key_hides_old_value() {
        let base = base();
        let mut journal = Journal::new(&base);
        let label = Label::new("Entity");
        let army = NodeId::new(1);

        journal.set_node_property(&base, army, "name", "U.S. Army".into()).unwrap();
        assert_eq!(journal.find_node(&base, &label, "name", "United States Army"), None);
        assert_eq!(journal.find_node(&base, &label, "name", "U.S. Army"), Some(army));

        // An untouched key of the same node still resolves through the base
        journal.set_node_property(&base, army, "website", "https://www.army.mil".into()).unwrap();
        assert_eq!(journal.find_node(&base, &label, "name", "Department of Defense"), Some(NodeId::new(2)));
    }

    #[test]
    fn test_oldest_match_wins_across_base_and_journal() {
        let base = base();
        let mut journal = Journal::new(&base);
        let label = Label::new("Entity");

        let copy = journal.create_node(&label);
        journal.set_node_property(&base, copy, "name", "Department of Defense".into()).unwrap();
        assert_eq!(journal.find_node(&base, &label, "name", "Department of Defense"), Some(NodeId::new(2)));
    }

    #[test]
    fn test_edges_merge_base_and_created() {
        let base = base();
        let mut journal = Journal::new(&base);
        let army = NodeId::new(1);
        let dod = NodeId::new(2);
        let child_of = EdgeType::new("CHILD_OF");

        let existing = EdgeId::new(1);
        journal.set_edge_property(&base, existing, "since", 1947i64.into()).unwrap();
        let created = journal.create_edge(&base, army, dod, &EdgeType::new("RELATED_TO")).unwrap();
        assert_eq!(created, EdgeId::new(2));

        let edges = journal.outgoing_edges(&base, army, &child_of);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].get_property("since"), Some(&PropertyValue::Integer(1947)));
        assert!(base.get_edge(existing).unwrap().get_property("since").is_none());
        assert_eq!(journal.outgoing_edges(&base, army, &EdgeType::new("RELATED_TO")).len(), 1);

        assert_eq!(
            journal.create_edge(&base, army, NodeId::new(40), &child_of),
            Err(StoreError::InvalidEdgeTarget(NodeId::new(40)))
        );
    }

    #[test]
    fn test_publish_applies_every_write() {
        let mut store = base();
        let mut journal = Journal::new(&store);
        let label = Label::new("Entity");

        journal.set_node_property(&store, NodeId::new(1), "name", "U.S. Army".into()).unwrap();
        let guard = journal.create_node(&label);
        journal.set_node_property(&store, guard, "name", "Army National Guard".into()).unwrap();
        journal
            .create_edge(&store, guard, NodeId::new(1), &EdgeType::new("CHILD_OF"))
            .unwrap();
        journal.set_edge_property(&store, EdgeId::new(1), "since", 1947i64.into()).unwrap();
        assert!(!journal.is_empty());

        journal.publish(&mut store).unwrap();
        assert_eq!(store.find_node(&label, "name", "U.S. Army"), Some(NodeId::new(1)));
        assert_eq!(store.find_node(&label, "name", "United States Army"), None);
        assert_eq!(store.find_node(&label, "name", "Army National Guard"), Some(guard));
        assert_eq!(store.get_incoming_edges(NodeId::new(1)).len(), 1);
        assert_eq!(
            store.get_edge(EdgeId::new(1)).unwrap().get_property("since"),
            Some(&PropertyValue::Integer(1947))
        );
    }

    #[test]
    fn test_publish_refuses_a_moved_store() {
        let mut store = base();
        let mut journal = Journal::new(&store);
        journal.create_node(&Label::new("Entity"));

        store.create_node("Entity");
        assert!(journal.publish(&mut store).is_err());
    }
}
