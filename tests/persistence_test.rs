use docgraph::graph::MemoryGraph;
use docgraph::ingest::{self, install_key_indices, IngestOutcome, NodeKind};
use docgraph::{load_snapshot, save_snapshot};
use std::fs;
use tempfile::TempDir;

fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_reload_keeps_ingestion_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data").join("graph.snapshot");

    let mut store = load_snapshot(&path).unwrap();
    assert_eq!(store.node_count(), 0);
    install_key_indices(&mut store);
    let graph = MemoryGraph::with_store(store);

    ingest::ingest_document_json(&graph, &fixture("document.json")).unwrap();
    ingest::ingest_entities_json(&graph, &fixture("entities.json")).unwrap();
    ingest::resolve_references(&graph).unwrap();
    let before = graph.statistics().unwrap();
    save_snapshot(&graph.snapshot().unwrap(), &path).unwrap();

    // A fresh process: load, reinstall indices, replay the same input
    let mut store = load_snapshot(&path).unwrap();
    install_key_indices(&mut store);
    let reloaded = MemoryGraph::with_store(store);
    assert_eq!(reloaded.statistics().unwrap().node_count, before.node_count);
    assert_eq!(reloaded.statistics().unwrap().edge_count, before.edge_count);

    let doc = ingest::ingest_document_json(&reloaded, &fixture("document.json")).unwrap();
    assert_eq!(doc, IngestOutcome::new(0, 0, 34));
    let entities = ingest::ingest_entities_json(&reloaded, &fixture("entities.json")).unwrap();
    assert_eq!(entities.nodes_created, 0);
    assert_eq!(entities.relationships_created, 0);
    assert_eq!(ingest::resolve_references(&reloaded).unwrap(), IngestOutcome::default());
}

#[test]
fn test_reloaded_keys_are_indexed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.snapshot");

    let mut store = load_snapshot(&path).unwrap();
    install_key_indices(&mut store);
    let graph = MemoryGraph::with_store(store);
    ingest::ingest_orgs_json(&graph, &fixture("orgs.json")).unwrap();
    save_snapshot(&graph.snapshot().unwrap(), &path).unwrap();

    let store = load_snapshot(&path).unwrap();
    let org = NodeKind::Org;
    assert!(store.has_key_index(&org.label(), org.key_property()));
    assert!(store.find_node(&org.label(), "name", "Office of the Secretary of Defense").is_some());
    assert!(store.find_node(&org.label(), "name", "Nowhere").is_none());
}
