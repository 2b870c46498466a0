//! Property graph data model and store
//!
//! - Nodes with one label and ordered properties
//! - Directed, typed edges with properties
//! - An append-only in-memory store with label, edge type and key indices
//! - The transactional seam the ingestion engine is written against
//! - Per-transaction write journals over the shared committed store

pub mod edge;
pub mod journal;
pub mod node;
pub mod property;
pub mod store;
pub mod transaction;
pub mod types;

// Re-export main types
pub use edge::Edge;
pub use journal::Journal;
pub use node::Node;
pub use property::{properties_to_json, PropertyMap, PropertyValue};
pub use store::{GraphStatistics, GraphStore, StoreError, StoreResult};
pub use transaction::{GraphDatabase, GraphTransaction, MemoryGraph, MemoryTransaction};
pub use types::{EdgeId, EdgeType, Label, NodeId};
