//! Citation resolution between documents
//!
//! The pass runs in two phases over one consistent view of the graph:
//!
//! 1. **Index**: every `Document` is grouped under its `ref_name`, and every
//!    citation found in any `ref_list` gets an entry, empty when no document
//!    answers to it.
//! 2. **Resolve**: each citation of each document becomes `REFERENCES` edges
//!    to every document indexed under it, or one `REFERENCES_UKN` edge to the
//!    shared `UKN_Document` placeholder for that citation.
//!
//! All edges go through [`link`], so a second pass over an unchanged graph
//! creates nothing.

use super::link::link;
use super::merge::{merge_properties, PropertyBag};
use super::outcome::IngestOutcome;
use super::resolver::resolve_node;
use super::schema::{NodeKind, RelType};
use crate::graph::{GraphTransaction, NodeId, PropertyValue, StoreResult};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

/// Prefix of every placeholder's `doc_id` and `name`
pub const PLACEHOLDER_PREFIX: &str = "UKN Document: ";

/// A document and the citations it makes
#[derive(Debug, Clone)]
struct CitingDocument {
    node: NodeId,
    doc_id: String,
    citations: Vec<String>,
}

/// Documents grouped by the name they are cited by
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    targets: FxHashMap<String, Vec<NodeId>>,
    documents: Vec<CitingDocument>,
}

impl ReferenceIndex {
    /// Scan every `Document` node once
    pub fn build<T: GraphTransaction>(tx: &T) -> StoreResult<Self> {
        let mut index = Self::default();
        let mut unnamed = 0usize;

        for node in tx.nodes_by_label(&NodeKind::Document.label())? {
            let doc_id = text_property(tx, node, "doc_id")?.unwrap_or_default();
            match text_property(tx, node, "ref_name")? {
                Some(ref_name) => index.targets.entry(ref_name).or_default().push(node),
                None => {
                    warn!("document {:?} has no ref_name and cannot be cited", doc_id);
                    unnamed += 1;
                }
            }

            let citations = match tx.node_property(node, "ref_list")? {
                Some(PropertyValue::StringList(items)) => items,
                _ => Vec::new(),
            };
            for citation in &citations {
                index.targets.entry(citation.clone()).or_default();
            }
            index.documents.push(CitingDocument {
                node,
                doc_id,
                citations,
            });
        }

        debug!(
            "reference index: {} documents, {} names, {} without ref_name",
            index.documents.len(),
            index.targets.len(),
            unnamed
        );
        Ok(index)
    }

    /// Documents cited as `name`; empty for an unknown name
    pub fn targets(&self, name: &str) -> &[NodeId] {
        self.targets.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Citations no document answers to
    pub fn unresolved(&self) -> impl Iterator<Item = &str> {
        self.targets
            .iter()
            .filter(|(_, docs)| docs.is_empty())
            .map(|(name, _)| name.as_str())
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }
}

fn text_property<T: GraphTransaction>(tx: &T, node: NodeId, key: &str) -> StoreResult<Option<String>> {
    Ok(match tx.node_property(node, key)? {
        Some(PropertyValue::String(s)) => Some(s),
        _ => None,
    })
}

/// Fields of a new placeholder for `citation`
///
/// `doc_type` and `doc_num` split the citation at its first space; a
/// citation without a space is all type and no number.
pub fn placeholder_properties(citation: &str) -> PropertyBag {
    let (doc_type, doc_num) = citation.split_once(' ').unwrap_or((citation, ""));
    let placeholder_id = format!("{}{}", PLACEHOLDER_PREFIX, citation);
    PropertyBag::new()
        .text("doc_id", placeholder_id.as_str())
        .text("ref_name", citation)
        .text("doc_type", doc_type)
        .text("doc_num", doc_num)
        .text("title", citation)
        .text("name", placeholder_id)
        .text("display_title_s", citation)
        .text("display_doc_type_s", "Unknown Document")
        .text("display_org_s", "")
        .text("type", "ukn_document")
}

/// Run both phases and link every citation of every document
pub fn resolve_all<T: GraphTransaction>(tx: &mut T) -> StoreResult<IngestOutcome> {
    let index = ReferenceIndex::build(tx)?;
    let mut total = IngestOutcome::default();

    for doc in &index.documents {
        let mut outcome = IngestOutcome::default();
        for citation in &doc.citations {
            let targets = index.targets(citation);
            if targets.is_empty() {
                outcome += link_placeholder(tx, doc.node, citation)?;
            } else {
                for &target in targets {
                    if link(tx, doc.node, target, RelType::References)?.is_some() {
                        outcome.relationships_created += 1;
                    }
                }
                warn_if_stale(tx, doc, citation)?;
            }
        }
        if !outcome.is_shape_noop() {
            debug!("{} for: {}", outcome, doc.doc_id);
        }
        total += outcome;
    }

    Ok(total)
}

fn link_placeholder<T: GraphTransaction>(tx: &mut T, from: NodeId, citation: &str) -> StoreResult<IngestOutcome> {
    let placeholder_id = format!("{}{}", PLACEHOLDER_PREFIX, citation);
    let resolved = resolve_node(tx, NodeKind::UnknownDocument, &placeholder_id)?;
    let mut outcome = IngestOutcome::default();
    if resolved.created {
        outcome.count_node(true);
        outcome.count_properties(merge_properties(tx, resolved.node, placeholder_properties(citation))?);
    }
    if link(tx, from, resolved.node, RelType::ReferencesUnknown)?.is_some() {
        outcome.relationships_created += 1;
    }
    Ok(outcome)
}

/// Placeholder edges stay after the cited document arrives; flag them
fn warn_if_stale<T: GraphTransaction>(tx: &T, doc: &CitingDocument, citation: &str) -> StoreResult<()> {
    for edge in tx.outgoing_edges(doc.node, &RelType::ReferencesUnknown.edge_type())? {
        if text_property(tx, edge.target, "ref_name")?.as_deref() == Some(citation) {
            warn!(
                "document {:?} still references placeholder for {:?}, which now resolves",
                doc.doc_id, citation
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphDatabase, Label, MemoryGraph};

    fn add_document<T: GraphTransaction>(tx: &mut T, doc_id: &str, ref_name: Option<&str>, refs: &[&str]) -> NodeId {
        let node = tx.create_node(&Label::new("Document")).unwrap();
        tx.set_node_property(node, "doc_id", doc_id.into()).unwrap();
        if let Some(ref_name) = ref_name {
            tx.set_node_property(node, "ref_name", ref_name.into()).unwrap();
        }
        let refs: Vec<String> = refs.iter().map(|r| r.to_string()).collect();
        tx.set_node_property(node, "ref_list", refs.into()).unwrap();
        node
    }

    #[test]
    fn test_placeholder_properties() {
        let bag = placeholder_properties("Title 10");
        assert_eq!(bag.len(), 10);
        let fields: Vec<_> = bag.iter().map(|(name, _)| *name).collect();
        assert_eq!(&fields[..4], &["doc_id", "ref_name", "doc_type", "doc_num"]);

        let graph = MemoryGraph::new();
        let mut tx = graph.begin().unwrap();
        let node = tx.create_node(&NodeKind::UnknownDocument.label()).unwrap();
        merge_properties(&mut tx, node, placeholder_properties("EO 12333")).unwrap();
        assert_eq!(tx.node_property(node, "doc_type").unwrap(), Some("EO".into()));
        assert_eq!(tx.node_property(node, "doc_num").unwrap(), Some("12333".into()));
        assert_eq!(tx.node_property(node, "name").unwrap(), Some("UKN Document: EO 12333".into()));

        let node = tx.create_node(&NodeKind::UnknownDocument.label()).unwrap();
        merge_properties(&mut tx, node, placeholder_properties("Constitution")).unwrap();
        assert_eq!(tx.node_property(node, "doc_type").unwrap(), Some("Constitution".into()));
        assert_eq!(tx.node_property(node, "doc_num").unwrap(), Some("".into()));
    }

    #[test]
    fn test_index_seeds_unresolved_citations() {
        let graph = MemoryGraph::new();
        let mut tx = graph.begin().unwrap();
        let a = add_document(&mut tx, "a", Some("DoDD 5000.01"), &["Title 10"]);
        let b = add_document(&mut tx, "b", Some("DoDD 5000.01"), &[]);
        add_document(&mut tx, "c", None, &["DoDD 5000.01"]);

        let index = ReferenceIndex::build(&tx).unwrap();
        assert_eq!(index.document_count(), 3);
        assert_eq!(index.targets("DoDD 5000.01"), &[a, b]);
        assert!(index.targets("Title 10").is_empty());
        assert_eq!(index.unresolved().collect::<Vec<_>>(), vec!["Title 10"]);
    }

    #[test]
    fn test_document_without_ref_name_still_cites() {
        let graph = MemoryGraph::new();
        let mut tx = graph.begin().unwrap();
        let cited = add_document(&mut tx, "a", Some("AR 25-1"), &[]);
        let citing = add_document(&mut tx, "b", None, &["AR 25-1"]);

        let outcome = resolve_all(&mut tx).unwrap();
        assert_eq!(outcome, IngestOutcome::new(0, 1, 0));
        let edges = tx.outgoing_edges(citing, &RelType::References.edge_type()).unwrap();
        assert_eq!(edges[0].target, cited);
    }

    #[test]
    fn test_self_citation_links_to_self() {
        let graph = MemoryGraph::new();
        let mut tx = graph.begin().unwrap();
        let doc = add_document(&mut tx, "a", Some("AR 25-1"), &["AR 25-1", "AR 25-1"]);

        assert_eq!(resolve_all(&mut tx).unwrap(), IngestOutcome::new(0, 1, 0));
        assert_eq!(tx.outgoing_edges(doc, &RelType::References.edge_type()).unwrap()[0].target, doc);
    }

    #[test]
    fn test_placeholder_edge_survives_resolution() {
        let graph = MemoryGraph::new();
        let mut tx = graph.begin().unwrap();
        let citing = add_document(&mut tx, "a", Some("AR 25-1"), &["AR 25-2"]);
        assert_eq!(resolve_all(&mut tx).unwrap(), IngestOutcome::new(1, 1, 10));

        let cited = add_document(&mut tx, "b", Some("AR 25-2"), &[]);
        assert_eq!(resolve_all(&mut tx).unwrap(), IngestOutcome::new(0, 1, 0));

        assert_eq!(tx.outgoing_edges(citing, &RelType::References.edge_type()).unwrap()[0].target, cited);
        assert_eq!(tx.outgoing_edges(citing, &RelType::ReferencesUnknown.edge_type()).unwrap().len(), 1);
    }
}
