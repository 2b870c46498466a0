//! Read-only subgraph around a set of documents

use crate::graph::{
    properties_to_json, Edge, EdgeId, EdgeType, GraphDatabase, GraphTransaction, Node, NodeId, PropertyValue,
    StoreResult,
};
use crate::ingest::{NodeKind, RelType};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// A node of a [`GraphView`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewNode {
    pub id: NodeId,
    pub label: String,
    pub properties: Map<String, Value>,
}

impl From<&Node> for ViewNode {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id,
            label: node.label.as_str().to_string(),
            properties: properties_to_json(&node.properties),
        }
    }
}

/// A relationship of a [`GraphView`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewRelationship {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type")]
    pub rel_type: String,
    pub properties: Map<String, Value>,
}

impl From<&Edge> for ViewRelationship {
    fn from(edge: &Edge) -> Self {
        Self {
            id: edge.id,
            source: edge.source,
            target: edge.target,
            rel_type: edge.edge_type.as_str().to_string(),
            properties: properties_to_json(&edge.properties),
        }
    }
}

/// Nodes and relationships of a view, each listed once in order of first
/// appearance
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphView {
    pub nodes: Vec<ViewNode>,
    pub relationships: Vec<ViewRelationship>,
}

impl GraphView {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }
}

/// The main graph view for `doc_ids`
///
/// For every `Document` whose `doc_id` is listed: the document, its
/// `REFERENCES` to other listed documents, and its `MENTIONS` and
/// `CONTAINS` relationships with their entities and topics. Unknown ids are
/// ignored. Runs in a transaction that is never written to.
pub fn main_graph_view<D: GraphDatabase>(db: &D, doc_ids: &[String]) -> StoreResult<GraphView> {
    let tx = db.begin()?;
    let view = collect(&tx, doc_ids);
    tx.rollback();
    view
}

fn collect<T: GraphTransaction>(tx: &T, doc_ids: &[String]) -> StoreResult<GraphView> {
    let wanted: HashSet<&str> = doc_ids.iter().map(String::as_str).collect();
    let mut nodes: IndexMap<NodeId, ViewNode> = IndexMap::new();
    let mut relationships: IndexMap<EdgeId, ViewRelationship> = IndexMap::new();

    for id in tx.nodes_by_label(&NodeKind::Document.label())? {
        let doc = tx.node(id)?;
        if !doc_id_in(&doc, &wanted) {
            continue;
        }
        nodes.entry(doc.id).or_insert_with(|| ViewNode::from(&doc));

        for edge in tx.outgoing_edges(id, &RelType::References.edge_type())? {
            if edge.target == id {
                continue;
            }
            if doc_id_in(&tx.node(edge.target)?, &wanted) {
                relationships.entry(edge.id).or_insert_with(|| ViewRelationship::from(&edge));
            }
        }

        for rel in [RelType::Mentions, RelType::Contains] {
            add_with_targets(tx, id, &rel.edge_type(), &mut nodes, &mut relationships)?;
        }
    }

    Ok(GraphView {
        nodes: nodes.into_values().collect(),
        relationships: relationships.into_values().collect(),
    })
}

fn add_with_targets<T: GraphTransaction>(
    tx: &T,
    from: NodeId,
    edge_type: &EdgeType,
    nodes: &mut IndexMap<NodeId, ViewNode>,
    relationships: &mut IndexMap<EdgeId, ViewRelationship>,
) -> StoreResult<()> {
    for edge in tx.outgoing_edges(from, edge_type)? {
        if !nodes.contains_key(&edge.target) {
            let target = tx.node(edge.target)?;
            nodes.insert(target.id, ViewNode::from(&target));
        }
        relationships.entry(edge.id).or_insert_with(|| ViewRelationship::from(&edge));
    }
    Ok(())
}

fn doc_id_in(node: &Node, wanted: &HashSet<&str>) -> bool {
    matches!(node.get_property("doc_id"), Some(PropertyValue::String(id)) if wanted.contains(id.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::MemoryGraph;
    use crate::ingest::{ingest_document, resolve_references, DocumentRecord};

    fn doc(id: &str, doc_type: &str, doc_num: &str, refs: &[&str], topics: &[&str]) -> DocumentRecord {
        DocumentRecord {
            id: id.to_string(),
            doc_type: doc_type.to_string(),
            doc_num: doc_num.to_string(),
            ref_list: refs.iter().map(|r| r.to_string()).collect(),
            topics: topics.iter().map(|t| (t.to_string(), 0.5)).collect(),
            ..Default::default()
        }
    }

    fn graph() -> MemoryGraph {
        let graph = MemoryGraph::new();
        ingest_document(&graph, &doc("a.pdf_0", "AR", "1", &["AR 2", "AR 1"], &["award"])).unwrap();
        ingest_document(&graph, &doc("b.pdf_0", "AR", "2", &["AR 3"], &["award"])).unwrap();
        ingest_document(&graph, &doc("c.pdf_0", "AR", "3", &[], &[])).unwrap();
        resolve_references(&graph).unwrap();
        graph
    }

    #[test]
    fn test_view_keeps_references_inside_the_set() {
        let graph = graph();
        let ids = vec!["a.pdf_0".to_string(), "b.pdf_0".to_string()];
        let view = main_graph_view(&graph, &ids).unwrap();

        let labels: Vec<&str> = view.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Document", "Topic", "Document"]);

        let types: Vec<&str> = view.relationships.iter().map(|r| r.rel_type.as_str()).collect();
        // a->b REFERENCES, a CONTAINS award, b CONTAINS award; a->a and b->c dropped
        assert_eq!(types, vec!["REFERENCES", "CONTAINS", "CONTAINS"]);
    }

    #[test]
    fn test_unknown_ids_give_empty_view() {
        let graph = graph();
        let view = main_graph_view(&graph, &["missing.pdf_0".to_string()]).unwrap();
        assert!(view.is_empty());
        assert_eq!(graph.version().unwrap(), 4);
    }

    #[test]
    fn test_view_serializes_type_field() {
        let graph = graph();
        let view = main_graph_view(&graph, &["c.pdf_0".to_string()]).unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["nodes"][0]["label"], "Document");
        assert_eq!(json["nodes"][0]["properties"]["doc_id"], "c.pdf_0");
        assert!(json["relationships"].as_array().unwrap().is_empty());
    }
}
