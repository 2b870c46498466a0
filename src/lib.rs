//! Docgraph
//!
//! An idempotent upsert engine that turns crawled policy documents, agency
//! profiles, organizational units and roles into a property graph, and
//! links document citations to the documents they name.
//!
//! # Architecture
//!
//! - [`graph`]: in-memory property graph with natural-key indices and
//!   optimistic transactions behind the `GraphDatabase` / `GraphTransaction`
//!   seam
//! - [`index`]: exact-match indices over string key properties
//! - [`ingest`]: record parsing, find-or-create by natural key, property
//!   merge, duplicate-safe linking, and the citation resolution pass
//! - [`view`]: read-only subgraph around a set of documents
//! - [`persistence`]: bincode snapshots of the whole graph
//! - [`config`]: YAML and environment configuration
//!
//! Every ingestion call is one transaction. Running it again with the same
//! input leaves the graph shape unchanged.
//!
//! ## Example Usage
//!
//! ```rust
//! use docgraph::graph::MemoryGraph;
//! use docgraph::ingest;
//!
//! let graph = MemoryGraph::indexed();
//!
//! let doc = r#"{"id": "AR 25-1.pdf_0", "doc_type": "AR", "doc_num": "25-1",
//!               "ref_list": ["DoDI 8320.02"]}"#;
//! ingest::ingest_document_json(&graph, doc).unwrap();
//!
//! // The citation has no document yet, so it gets a placeholder
//! let outcome = ingest::resolve_references(&graph).unwrap();
//! assert_eq!(outcome.nodes_created, 1);
//! assert_eq!(outcome.relationships_created, 1);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod graph;
pub mod index;
pub mod ingest;
pub mod persistence;
pub mod view;

// Re-export main types for convenience
pub use config::{ConfigError, DocgraphConfig};
pub use graph::{
    Edge, EdgeId, EdgeType, GraphDatabase, GraphStore, GraphTransaction, Label, MemoryGraph, Node, NodeId,
    PropertyMap, PropertyValue, StoreError, StoreResult,
};
pub use ingest::{
    ingest_document, ingest_document_json, ingest_entities, ingest_entities_json, ingest_orgs, ingest_orgs_json,
    ingest_roles, ingest_roles_json, resolve_references, DocumentRecord, EntityRecord, IngestError, IngestOutcome,
    IngestResult, OrgRecord, RoleRecord,
};
pub use persistence::{load_snapshot, save_snapshot, PersistenceError, PersistenceResult};
pub use view::{main_graph_view, GraphView};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
