//! Entity (agency) upsert

use super::link::link;
use super::merge::{merge_properties, PropertyBag};
use super::outcome::IngestOutcome;
use super::record::EntityRecord;
use super::resolver::{resolve_named, resolve_node};
use super::schema::{NodeKind, RelType};
use crate::graph::{GraphTransaction, StoreResult};

/// Upsert one agency, its parent and its related agencies
///
/// The parent is linked even when the field is empty, so agencies without a
/// parent all point at the one Entity named `""`. The same holds for an
/// empty related-agency field.
pub fn upsert_entity<T: GraphTransaction>(tx: &mut T, record: &EntityRecord) -> StoreResult<IngestOutcome> {
    let resolved = resolve_node(tx, NodeKind::Entity, &record.agency_name)?;
    let entity = resolved.node;
    let mut outcome = IngestOutcome::default();
    outcome.count_node(resolved.created);

    let bag = PropertyBag::new()
        .text("name", record.agency_name.as_str())
        .text("aliases", record.agency_aliases.as_str())
        .text("website", record.website.as_str())
        .text("image", record.agency_image.as_str())
        .text("address", record.address.as_str())
        .text("phone", record.phone.as_str())
        .text("tty", record.tty.as_str())
        .text("tollfree", record.toll_free.as_str())
        .text("branch", record.government_branch.as_str())
        .text("type", "organization");
    outcome.count_properties(merge_properties(tx, entity, bag)?);

    let (parent, created) = resolve_named(tx, NodeKind::Entity, &record.parent_agency)?;
    outcome += created;
    if link(tx, entity, parent, RelType::ChildOf)?.is_some() {
        outcome.relationships_created += 1;
    }

    for related_name in record.related_agencies() {
        let (related, created) = resolve_named(tx, NodeKind::Entity, related_name)?;
        outcome += created;
        if link(tx, entity, related, RelType::RelatedTo)?.is_some() {
            outcome.relationships_created += 1;
        }
        if link(tx, related, entity, RelType::RelatedTo)?.is_some() {
            outcome.relationships_created += 1;
        }
    }

    Ok(outcome)
}
