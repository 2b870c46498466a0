//! Document upsert

use super::link::{link, link_with};
use super::merge::{merge_properties, PropertyBag};
use super::outcome::IngestOutcome;
use super::record::DocumentRecord;
use super::resolver::{resolve_named, resolve_node};
use super::schema::{NodeKind, RelType};
use crate::graph::{GraphTransaction, NodeId, PropertyValue, StoreResult};

/// Upsert one document with its topics, mentioned entities and type
pub fn upsert_document<T: GraphTransaction>(tx: &mut T, record: &DocumentRecord) -> StoreResult<IngestOutcome> {
    let resolved = resolve_node(tx, NodeKind::Document, &record.id)?;
    let doc = resolved.node;
    let mut outcome = IngestOutcome::default();
    outcome.count_node(resolved.created);

    for (topic, relevancy) in &record.topics {
        outcome += link_topic(tx, doc, topic, *relevancy)?;
    }

    for (entity, count) in &record.entities {
        let (target, created) = resolve_named(tx, NodeKind::Entity, entity)?;
        outcome += created;
        outcome += link_with(tx, doc, target, RelType::Mentions, &[("count", PropertyValue::Integer(*count))])?;
    }

    if !record.doc_type.is_empty() {
        let (doc_type, created) = resolve_named(tx, NodeKind::DocType, &record.doc_type)?;
        outcome += created;
        if link(tx, doc, doc_type, RelType::TypeOf)?.is_some() {
            outcome.relationships_created += 1;
        }
    }

    let applied = merge_properties(tx, doc, document_properties(record))?;
    outcome.count_properties(applied);
    Ok(outcome)
}

/// Topic stub plus CONTAINS and IS_IN, both carrying the relevancy
fn link_topic<T: GraphTransaction>(tx: &mut T, doc: NodeId, topic: &str, relevancy: f64) -> StoreResult<IngestOutcome> {
    let (node, mut outcome) = resolve_named(tx, NodeKind::Topic, topic)?;
    let props = [("relevancy", PropertyValue::Float(relevancy))];
    outcome += link_with(tx, doc, node, RelType::Contains, &props)?;
    outcome += link_with(tx, node, doc, RelType::IsIn, &props)?;
    Ok(outcome)
}

/// The 34 stored document properties
fn document_properties(record: &DocumentRecord) -> PropertyBag {
    let topic_names: Vec<String> = record.topics.iter().map(|(name, _)| name.clone()).collect();
    let name = record.filename.split(".pdf").next().unwrap_or_default();

    PropertyBag::new()
        .text("doc_id", record.id.as_str())
        .list("keyw_5", &record.keyw_5)
        .list("topics", &topic_names)
        .list("ref_list", &record.ref_list)
        .text("filename", record.filename.as_str())
        .text("title", record.title.replace('"', "'"))
        .text("display_title_s", record.display_title_s.replace('"', "'"))
        .text("display_org_s", record.display_org_s.as_str())
        .text("display_doc_type_s", record.display_doc_type_s.as_str())
        .text("access_timestamp_dt", record.access_timestamp_dt.as_str())
        .text("publication_date_dt", record.publication_date_dt.as_str())
        .text("crawler_used_s", record.crawler_used_s.as_str())
        .text("source_fqdn_s", record.source_fqdn_s.as_str())
        .text("source_page_url_s", record.source_page_url_s.as_str())
        .text("download_url_s", record.download_url_s.as_str())
        .boolean("cac_login_required_b", record.cac_login_required_b)
        .text("doc_num", record.doc_num.as_str())
        .text("doc_type", record.doc_type.as_str())
        .text("summary_30", record.summary_30.replace('"', "'").replace('\\', "/"))
        .text("type", record.record_type.as_str())
        .text("name", name)
        .text("ref_name", record.ref_name())
        .int("page_count", record.page_count)
        .text("init_date", record.init_date.as_str())
        .text("change_date", record.change_date.as_str())
        .text("author", record.author.as_str())
        .text("signature", record.signature.as_str())
        .text("subject", record.subject.as_str())
        .text("classification", record.classification.as_str())
        .text("group_s", record.group_s.as_str())
        .float("pagerank_r", record.pagerank_r)
        .float("kw_doc_score_r", record.kw_doc_score_r)
        .text("version_hash_s", record.version_hash_s.as_str())
        .boolean("is_revoked_b", record.is_revoked_b)
}
