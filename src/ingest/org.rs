//! Organizational unit and role upserts

use super::link::link;
use super::merge::{merge_properties, PropertyBag};
use super::outcome::IngestOutcome;
use super::record::{OrgRecord, RoleRecord};
use super::resolver::{resolve_named, resolve_node};
use super::schema::{NodeKind, RelType};
use crate::graph::{GraphTransaction, NodeId, StoreResult};

/// Resolve the `kind` node named `name` and link it with `node` by `rel`,
/// pointing at `node` when `incoming`. Empty names are skipped.
fn link_named<T: GraphTransaction>(
    tx: &mut T,
    node: NodeId,
    kind: NodeKind,
    name: &str,
    rel: RelType,
    incoming: bool,
) -> StoreResult<IngestOutcome> {
    if name.is_empty() {
        return Ok(IngestOutcome::default());
    }
    let (other, mut outcome) = resolve_named(tx, kind, name)?;
    let (from, to) = if incoming { (other, node) } else { (node, other) };
    if link(tx, from, to, rel)?.is_some() {
        outcome.relationships_created += 1;
    }
    Ok(outcome)
}

/// Upsert one org with its parent, type, subtype and head role
pub fn upsert_org<T: GraphTransaction>(tx: &mut T, record: &OrgRecord) -> StoreResult<IngestOutcome> {
    let resolved = resolve_node(tx, NodeKind::Org, &record.name)?;
    let org = resolved.node;
    let mut outcome = IngestOutcome::default();
    outcome.count_node(resolved.created);

    let bag = PropertyBag::new()
        .text("name", record.name.as_str())
        .boolean("isDODComponent", record.dod_component)
        .boolean("isOSDComponent", record.osd_component)
        .text("type", "organization");
    outcome.count_properties(merge_properties(tx, org, bag)?);

    outcome += link_named(tx, org, NodeKind::Org, &record.parent, RelType::ChildOf, false)?;
    outcome += link_named(tx, org, NodeKind::Org, &record.org_type, RelType::TypeOf, false)?;
    outcome += link_named(tx, org, NodeKind::Org, &record.subtype, RelType::TypeOf, false)?;
    outcome += link_named(tx, org, NodeKind::Role, &record.head, RelType::HasHead, false)?;
    Ok(outcome)
}

/// Upsert one role with its parent role, owning org, type and subtype
///
/// The owning org points at the role: `org -[HAS_HEAD]-> role`.
pub fn upsert_role<T: GraphTransaction>(tx: &mut T, record: &RoleRecord) -> StoreResult<IngestOutcome> {
    let resolved = resolve_node(tx, NodeKind::Role, &record.name)?;
    let role = resolved.node;
    let mut outcome = IngestOutcome::default();
    outcome.count_node(resolved.created);

    let bag = PropertyBag::new().text("name", record.name.as_str()).text("type", "role");
    outcome.count_properties(merge_properties(tx, role, bag)?);

    outcome += link_named(tx, role, NodeKind::Role, &record.parent, RelType::ChildOf, false)?;
    outcome += link_named(tx, role, NodeKind::Org, &record.org_parent, RelType::HasHead, true)?;
    outcome += link_named(tx, role, NodeKind::Role, &record.role_type, RelType::TypeOf, false)?;
    outcome += link_named(tx, role, NodeKind::Role, &record.subtype, RelType::TypeOf, false)?;
    Ok(outcome)
}
