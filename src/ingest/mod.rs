//! Idempotent ingestion of documents, agencies, orgs and roles
//!
//! Every public call here is one unit of work: it begins a transaction on
//! the given [`GraphDatabase`], applies the whole record or batch, and
//! commits. Any error rolls the transaction back, leaving the graph as it
//! was. Re-running a call with the same input creates no nodes and no
//! relationships.
//!
//! ```
//! use docgraph::graph::MemoryGraph;
//! use docgraph::ingest;
//!
//! let graph = MemoryGraph::indexed();
//! let json = r#"[{"Name": "Joint Staff", "Parent": "Department of Defense"}]"#;
//!
//! let first = ingest::ingest_orgs_json(&graph, json).unwrap();
//! assert_eq!(first.nodes_created, 2);
//!
//! let again = ingest::ingest_orgs_json(&graph, json).unwrap();
//! assert!(again.is_shape_noop());
//! ```

pub mod document;
pub mod entity;
pub mod error;
pub mod link;
pub mod merge;
pub mod org;
pub mod outcome;
pub mod record;
pub mod references;
pub mod resolver;
pub mod schema;

pub use document::upsert_document;
pub use entity::upsert_entity;
pub use error::{IngestError, IngestResult};
pub use link::{link, link_with};
pub use merge::{merge_properties, FieldValue, PropertyBag};
pub use org::{upsert_org, upsert_role};
pub use outcome::IngestOutcome;
pub use record::{DocumentRecord, EntityRecord, OrgRecord, RoleRecord};
pub use references::{placeholder_properties, resolve_all, ReferenceIndex, PLACEHOLDER_PREFIX};
pub use resolver::{resolve_named, resolve_node, Resolved};
pub use schema::{install_key_indices, NodeKind, RelType};

use crate::graph::{GraphDatabase, GraphTransaction, StoreResult};
use tracing::{error, info};

/// Run `work` in one transaction, committing on success
fn run_unit_of_work<D, F>(db: &D, operation: &str, work: F) -> IngestResult<IngestOutcome>
where
    D: GraphDatabase,
    F: FnOnce(&mut D::Transaction) -> StoreResult<IngestOutcome>,
{
    let mut tx = db.begin()?;
    let outcome = match work(&mut tx) {
        Ok(outcome) => outcome,
        Err(e) => {
            tx.rollback();
            error!("{} failed, rolled back: {}", operation, e);
            return Err(e.into());
        }
    };
    if let Err(e) = tx.commit() {
        error!("{} failed to commit: {}", operation, e);
        return Err(e.into());
    }
    info!("{}: {}", operation, outcome);
    Ok(outcome)
}

fn upsert_batch<T, R>(
    tx: &mut T,
    records: &[R],
    upsert: fn(&mut T, &R) -> StoreResult<IngestOutcome>,
) -> StoreResult<IngestOutcome>
where
    T: GraphTransaction,
{
    let mut total = IngestOutcome::default();
    for record in records {
        total += upsert(tx, record)?;
    }
    Ok(total)
}

/// Ingest one document
pub fn ingest_document<D: GraphDatabase>(db: &D, record: &DocumentRecord) -> IngestResult<IngestOutcome> {
    run_unit_of_work(db, "ingest document", |tx| upsert_document(tx, record))
}

/// Parse and ingest one document JSON object
pub fn ingest_document_json<D: GraphDatabase>(db: &D, json: &str) -> IngestResult<IngestOutcome> {
    let record = DocumentRecord::from_json(json)?;
    ingest_document(db, &record)
}

/// Ingest a batch of agencies
pub fn ingest_entities<D: GraphDatabase>(db: &D, records: &[EntityRecord]) -> IngestResult<IngestOutcome> {
    run_unit_of_work(db, "ingest entities", |tx| upsert_batch(tx, records, upsert_entity))
}

pub fn ingest_entities_json<D: GraphDatabase>(db: &D, json: &str) -> IngestResult<IngestOutcome> {
    let records = EntityRecord::batch_from_json(json)?;
    ingest_entities(db, &records)
}

/// Ingest a batch of organizational units
pub fn ingest_orgs<D: GraphDatabase>(db: &D, records: &[OrgRecord]) -> IngestResult<IngestOutcome> {
    run_unit_of_work(db, "ingest orgs", |tx| upsert_batch(tx, records, upsert_org))
}

pub fn ingest_orgs_json<D: GraphDatabase>(db: &D, json: &str) -> IngestResult<IngestOutcome> {
    let records = OrgRecord::batch_from_json(json)?;
    ingest_orgs(db, &records)
}

/// Ingest a batch of roles
pub fn ingest_roles<D: GraphDatabase>(db: &D, records: &[RoleRecord]) -> IngestResult<IngestOutcome> {
    run_unit_of_work(db, "ingest roles", |tx| upsert_batch(tx, records, upsert_role))
}

pub fn ingest_roles_json<D: GraphDatabase>(db: &D, json: &str) -> IngestResult<IngestOutcome> {
    let records = RoleRecord::batch_from_json(json)?;
    ingest_roles(db, &records)
}

/// Link every document citation to its documents or to a placeholder
pub fn resolve_references<D: GraphDatabase>(db: &D) -> IngestResult<IngestOutcome> {
    run_unit_of_work(db, "resolve references", |tx| resolve_all(tx))
}
