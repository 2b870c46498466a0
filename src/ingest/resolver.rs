//! Find-or-create by natural key

use super::outcome::IngestOutcome;
use super::schema::NodeKind;
use crate::graph::{GraphTransaction, NodeId, PropertyValue, StoreResult};
use tracing::debug;

/// Result of a node lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub node: NodeId,
    pub created: bool,
}

/// Find the node of `kind` whose key property equals `key`, or create it
///
/// A created node has no properties, not even its key; the caller's merge
/// sets them. The empty string is an ordinary key value.
pub fn resolve_node<T: GraphTransaction>(tx: &mut T, kind: NodeKind, key: &str) -> StoreResult<Resolved> {
    let label = kind.label();
    if let Some(node) = tx.find_node(&label, kind.key_property(), key)? {
        return Ok(Resolved { node, created: false });
    }
    let node = tx.create_node(&label)?;
    debug!("created {} node {} for key {:?}", label, node, key);
    Ok(Resolved { node, created: true })
}

/// Find or create a node that is only referenced, never merged
///
/// Parents, topics, types, heads and related entities are created with
/// just their key property set. Returns the node and what was counted: one
/// node and one property when created, nothing otherwise.
pub fn resolve_named<T: GraphTransaction>(
    tx: &mut T,
    kind: NodeKind,
    key: &str,
) -> StoreResult<(NodeId, IngestOutcome)> {
    let resolved = resolve_node(tx, kind, key)?;
    let mut outcome = IngestOutcome::default();
    if resolved.created {
        tx.set_node_property(resolved.node, kind.key_property(), PropertyValue::from(key))?;
        outcome.count_node(true);
        outcome.count_properties(1);
    }
    Ok((resolved.node, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphDatabase, MemoryGraph};

    #[test]
    fn test_resolve_node_leaves_key_to_caller() {
        let graph = MemoryGraph::new();
        let mut tx = graph.begin().unwrap();

        let first = resolve_node(&mut tx, NodeKind::Document, "AGO 1976-02.pdf_0").unwrap();
        assert!(first.created);

        // Still unkeyed: a second lookup cannot see it yet
        let again = resolve_node(&mut tx, NodeKind::Document, "AGO 1976-02.pdf_0").unwrap();
        assert!(again.created);
        assert_ne!(first.node, again.node);
    }

    #[test]
    fn test_resolve_named_is_idempotent() {
        let graph = MemoryGraph::new();
        let mut tx = graph.begin().unwrap();

        let (topic, outcome) = resolve_named(&mut tx, NodeKind::Topic, "award").unwrap();
        assert_eq!(outcome, IngestOutcome::new(1, 0, 1));
        assert_eq!(tx.node_property(topic, "name").unwrap(), Some(PropertyValue::from("award")));

        let (same, outcome) = resolve_named(&mut tx, NodeKind::Topic, "award").unwrap();
        assert_eq!(same, topic);
        assert_eq!(outcome, IngestOutcome::default());

        let found = resolve_node(&mut tx, NodeKind::Topic, "award").unwrap();
        assert_eq!(found, Resolved { node: topic, created: false });
    }

    #[test]
    fn test_same_key_different_kinds_are_distinct() {
        let graph = MemoryGraph::new();
        let mut tx = graph.begin().unwrap();

        let (org, _) = resolve_named(&mut tx, NodeKind::Org, "Department of the Army").unwrap();
        let (role, _) = resolve_named(&mut tx, NodeKind::Role, "Department of the Army").unwrap();
        assert_ne!(org, role);
    }

    #[test]
    fn test_empty_key_collapses_to_one_node() {
        let graph = MemoryGraph::new();
        let mut tx = graph.begin().unwrap();

        let (a, first) = resolve_named(&mut tx, NodeKind::Entity, "").unwrap();
        let (b, second) = resolve_named(&mut tx, NodeKind::Entity, "").unwrap();
        assert_eq!(a, b);
        assert_eq!(first.nodes_created, 1);
        assert_eq!(second.nodes_created, 0);
    }
}
