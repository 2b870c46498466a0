//! Duplicate-safe relationship creation
//!
//! The existence check scans the source's outgoing edges of the requested
//! type, so a hub node (a topic in every document, a much-cited directive)
//! makes each call linear in its fan-out.

use super::outcome::IngestOutcome;
use super::schema::RelType;
use crate::graph::{EdgeId, GraphTransaction, NodeId, PropertyValue, StoreResult};
use tracing::debug;

/// Create `from -[rel]-> to` unless such an edge already exists
///
/// Returns the new edge, or `None` when one was already there. Properties
/// of an existing edge are never touched.
pub fn link<T: GraphTransaction>(tx: &mut T, from: NodeId, to: NodeId, rel: RelType) -> StoreResult<Option<EdgeId>> {
    let edge_type = rel.edge_type();
    if tx.outgoing_edges(from, &edge_type)?.iter().any(|e| e.target == to) {
        return Ok(None);
    }
    let edge = tx.create_edge(from, to, &edge_type)?;
    debug!("linked {} -[{}]-> {}", from, edge_type, to);
    Ok(Some(edge))
}

/// [`link`], then set `properties` on the edge if it was created
///
/// Counts one relationship plus one property per entry, or nothing.
pub fn link_with<T: GraphTransaction>(
    tx: &mut T,
    from: NodeId,
    to: NodeId,
    rel: RelType,
    properties: &[(&str, PropertyValue)],
) -> StoreResult<IngestOutcome> {
    let mut outcome = IngestOutcome::default();
    if let Some(edge) = link(tx, from, to, rel)? {
        outcome.relationships_created += 1;
        for (key, value) in properties {
            tx.set_edge_property(edge, key, value.clone())?;
        }
        outcome.count_properties(properties.len());
    }
    Ok(outcome)
}
