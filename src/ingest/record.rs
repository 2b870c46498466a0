//! Parsed input records
//!
//! Records are read leniently: only the identifying field of each kind is
//! required. Every other field that is missing, null or of an unexpected
//! shape falls back to an empty string, `0`, `false` or an empty list.

use super::error::{IngestError, IngestResult};
use serde_json::{Map, Value};

/// Read-only view over the fields of one JSON object
struct Fields<'a> {
    kind: &'static str,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn of(kind: &'static str, value: &'a Value) -> IngestResult<Self> {
        match value {
            Value::Object(map) => Ok(Self { kind, map }),
            other => Err(IngestError::invalid(
                kind,
                format!("expected a JSON object, found {}", json_type(other)),
            )),
        }
    }

    fn required(&self, field: &'static str) -> IngestResult<String> {
        match self.map.get(field) {
            Some(value) => Ok(scalar_text(value)),
            None => Err(IngestError::MissingField { kind: self.kind, field }),
        }
    }

    fn text(&self, field: &str) -> String {
        self.map.get(field).map(scalar_text).unwrap_or_default()
    }

    fn boolean(&self, field: &str) -> bool {
        match self.map.get(field) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
            Some(Value::Number(n)) => n.as_f64().map_or(false, |f| f != 0.0),
            _ => false,
        }
    }

    fn int(&self, field: &str) -> i64 {
        match self.map.get(field) {
            Some(value) => value_as_int(value),
            None => 0,
        }
    }

    fn float(&self, field: &str) -> f64 {
        match self.map.get(field) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    fn string_list(&self, field: &str) -> Vec<String> {
        match self.map.get(field) {
            Some(Value::Array(items)) => items.iter().map(scalar_text).collect(),
            _ => Vec::new(),
        }
    }

    fn object(&self, field: &str) -> Option<&'a Map<String, Value>> {
        self.map.get(field).and_then(Value::as_object)
    }
}

/// Text of a scalar; containers and null read as empty
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn value_as_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn parse_batch<R>(json: &str, kind: &'static str, parse: fn(&Value) -> IngestResult<R>) -> IngestResult<Vec<R>> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Array(items) => items.iter().map(parse).collect(),
        other => Err(IngestError::invalid(
            kind,
            format!("expected a JSON array of records, found {}", json_type(&other)),
        )),
    }
}

/// A crawled and enriched document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentRecord {
    pub id: String,
    pub doc_num: String,
    pub doc_type: String,
    /// Topic name and relevancy, in record order
    pub topics: Vec<(String, f64)>,
    /// Mentioned entity name and mention count, in record order
    pub entities: Vec<(String, i64)>,
    pub keyw_5: Vec<String>,
    pub ref_list: Vec<String>,
    pub filename: String,
    pub title: String,
    pub display_title_s: String,
    pub display_org_s: String,
    pub display_doc_type_s: String,
    pub access_timestamp_dt: String,
    pub publication_date_dt: String,
    pub crawler_used_s: String,
    pub source_fqdn_s: String,
    pub source_page_url_s: String,
    pub download_url_s: String,
    pub cac_login_required_b: bool,
    pub summary_30: String,
    pub record_type: String,
    pub page_count: i64,
    pub init_date: String,
    pub change_date: String,
    pub author: String,
    pub signature: String,
    pub subject: String,
    pub classification: String,
    pub group_s: String,
    pub pagerank_r: f64,
    pub kw_doc_score_r: f64,
    pub version_hash_s: String,
    pub is_revoked_b: bool,
}

impl DocumentRecord {
    pub const KIND: &'static str = "document";

    pub fn from_json(json: &str) -> IngestResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> IngestResult<Self> {
        let f = Fields::of(Self::KIND, value)?;

        let topics = f
            .object("topics_rs")
            .map(|topics| {
                topics
                    .iter()
                    .map(|(name, weight)| (name.clone(), weight.as_f64().unwrap_or(0.0)))
                    .collect()
            })
            .unwrap_or_default();

        // Names come from entityPars, counts from entityCounts
        let entities = f
            .object("entities")
            .map(|entities| {
                let counts = entities.get("entityCounts").and_then(Value::as_object);
                entities
                    .get("entityPars")
                    .and_then(Value::as_object)
                    .map(|pars| {
                        pars.keys()
                            .map(|name| {
                                let count = counts.and_then(|c| c.get(name)).map_or(0, value_as_int);
                                (name.clone(), count)
                            })
                            .collect()
                    })
                    .unwrap_or_default()
            })
            .unwrap_or_default();

        Ok(Self {
            id: f.required("id")?,
            doc_num: f.text("doc_num"),
            doc_type: f.text("doc_type"),
            topics,
            entities,
            keyw_5: f.string_list("keyw_5"),
            ref_list: f.string_list("ref_list"),
            filename: f.text("filename"),
            title: f.text("title"),
            display_title_s: f.text("display_title_s"),
            display_org_s: f.text("display_org_s"),
            display_doc_type_s: f.text("display_doc_type_s"),
            access_timestamp_dt: f.text("access_timestamp_dt"),
            publication_date_dt: f.text("publication_date_dt"),
            crawler_used_s: f.text("crawler_used_s"),
            source_fqdn_s: f.text("source_fqdn_s"),
            source_page_url_s: f.text("source_page_url_s"),
            download_url_s: f.text("download_url_s"),
            cac_login_required_b: f.boolean("cac_login_required_b"),
            summary_30: f.text("summary_30"),
            record_type: f.text("type"),
            page_count: f.int("page_count"),
            init_date: f.text("init_date"),
            change_date: f.text("change_date"),
            author: f.text("author"),
            signature: f.text("signature"),
            subject: f.text("subject"),
            classification: f.text("classification"),
            group_s: f.text("group_s"),
            pagerank_r: f.float("pagerank_r"),
            kw_doc_score_r: f.float("kw_doc_score_r"),
            version_hash_s: f.text("version_hash_s"),
            is_revoked_b: f.boolean("is_revoked_b"),
        })
    }

    /// Canonical name other documents cite this one by
    ///
    /// `"<doc_type> <doc_num>"` when both are present, otherwise the part of
    /// `id` before the first comma with every `.pdf_0` removed.
    pub fn ref_name(&self) -> String {
        if !self.doc_type.is_empty() && !self.doc_num.is_empty() {
            format!("{} {}", self.doc_type, self.doc_num)
        } else {
            let head = self.id.split(',').next().unwrap_or_default();
            head.replace(".pdf_0", "")
        }
    }
}

/// A government agency profile
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityRecord {
    pub agency_name: String,
    pub agency_aliases: String,
    pub website: String,
    pub agency_image: String,
    pub address: String,
    pub phone: String,
    pub tty: String,
    pub toll_free: String,
    pub government_branch: String,
    pub parent_agency: String,
    /// Semicolon separated agency names
    pub related_agency: String,
}

impl EntityRecord {
    pub const KIND: &'static str = "entity";

    pub fn from_value(value: &Value) -> IngestResult<Self> {
        let f = Fields::of(Self::KIND, value)?;
        Ok(Self {
            agency_name: f.required("Agency_Name")?,
            agency_aliases: f.text("Agency_Aliases"),
            website: f.text("Website"),
            agency_image: f.text("Agency_Image"),
            address: f.text("Address"),
            phone: f.text("Phone"),
            tty: f.text("TTY"),
            toll_free: f.text("TollFree"),
            government_branch: f.text("Government_Branch"),
            parent_agency: f.text("Parent_Agency"),
            related_agency: f.text("Related_Agency"),
        })
    }

    pub fn batch_from_json(json: &str) -> IngestResult<Vec<Self>> {
        parse_batch(json, Self::KIND, Self::from_value)
    }

    /// Related agency names, trimmed; an empty field yields one empty name
    pub fn related_agencies(&self) -> impl Iterator<Item = &str> {
        self.related_agency.split(';').map(str::trim)
    }
}

/// An organizational unit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrgRecord {
    pub name: String,
    pub parent: String,
    pub org_type: String,
    pub subtype: String,
    pub head: String,
    pub dod_component: bool,
    pub osd_component: bool,
}

impl OrgRecord {
    pub const KIND: &'static str = "org";

    pub fn from_value(value: &Value) -> IngestResult<Self> {
        let f = Fields::of(Self::KIND, value)?;
        Ok(Self {
            name: f.required("Name")?,
            parent: f.text("Parent"),
            org_type: f.text("Type"),
            subtype: f.text("Subtype"),
            head: f.text("Head"),
            dod_component: f.boolean("DoDComponent"),
            osd_component: f.boolean("OSDComponent"),
        })
    }

    pub fn batch_from_json(json: &str) -> IngestResult<Vec<Self>> {
        parse_batch(json, Self::KIND, Self::from_value)
    }
}

/// A position within an organization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleRecord {
    pub name: String,
    pub parent: String,
    pub org_parent: String,
    pub role_type: String,
    pub subtype: String,
}

impl RoleRecord {
    pub const KIND: &'static str = "role";

    pub fn from_value(value: &Value) -> IngestResult<Self> {
        let f = Fields::of(Self::KIND, value)?;
        Ok(Self {
            name: f.required("Name")?,
            parent: f.text("Parent"),
            org_parent: f.text("OrgParent"),
            role_type: f.text("Type"),
            subtype: f.text("Subtype"),
        })
    }

    pub fn batch_from_json(json: &str) -> IngestResult<Vec<Self>> {
        parse_batch(json, Self::KIND, Self::from_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_topics_and_entities_keep_record_order() {
        let value = json!({
            "id": "DoDD 5000.01.pdf_0",
            "topics_rs": {"acquisition": 0.4, "oversight": 0.2, "budget": 0.1},
            "entities": {
                "entityPars": {"Department of Defense": [1], "Congress": [2]},
                "entityCounts": {"Department of Defense": 3}
            }
        });
        let record = DocumentRecord::from_value(&value).unwrap();

        let topics: Vec<&str> = record.topics.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(topics, vec!["acquisition", "oversight", "budget"]);
        assert_eq!(
            record.entities,
            vec![("Department of Defense".to_string(), 3), ("Congress".to_string(), 0)]
        );
    }

    #[test]
    fn test_document_soft_defaults() {
        let record = DocumentRecord::from_value(&json!({
            "id": "Test 1.pdf_0",
            "kw_doc_score_r": null,
            "page_count": "12",
            "cac_login_required_b": "true",
            "keyw_5": "not a list",
            "topics_rs": []
        }))
        .unwrap();

        assert_eq!(record.kw_doc_score_r, 0.0);
        assert_eq!(record.page_count, 12);
        assert!(record.cac_login_required_b);
        assert!(record.keyw_5.is_empty());
        assert!(record.topics.is_empty());
        assert_eq!(record.title, "");
    }

    #[test]
    fn test_document_requires_id() {
        let err = DocumentRecord::from_value(&json!({"doc_num": "1"})).unwrap_err();
        assert!(matches!(err, IngestError::MissingField { kind: "document", field: "id" }));

        let err = DocumentRecord::from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, IngestError::InvalidRecord { kind: "document", .. }));

        assert!(matches!(DocumentRecord::from_json("{not json"), Err(IngestError::Json(_))));
    }

    #[test]
    fn test_ref_name() {
        let mut record = DocumentRecord {
            id: "AGO 1976-02.pdf_0".to_string(),
            doc_type: "AGO".to_string(),
            doc_num: "1976-02".to_string(),
            ..Default::default()
        };
        assert_eq!(record.ref_name(), "AGO 1976-02");

        record.doc_num.clear();
        assert_eq!(record.ref_name(), "AGO 1976-02");

        record.id = "Title 10.pdf_0,Title 10.pdf_1".to_string();
        assert_eq!(record.ref_name(), "Title 10");
    }

    #[test]
    fn test_entity_related_agencies() {
        let batch = EntityRecord::batch_from_json(
            r#"[{"Agency_Name": "Forest Service", "Related_Agency": "NRCS; APHIS ;"}]"#,
        )
        .unwrap();
        let related: Vec<&str> = batch[0].related_agencies().collect();
        assert_eq!(related, vec!["NRCS", "APHIS", ""]);

        let empty = EntityRecord {
            agency_name: "NAL".to_string(),
            ..Default::default()
        };
        assert_eq!(empty.related_agencies().collect::<Vec<_>>(), vec![""]);
    }

    #[test]
    fn test_batches_must_be_arrays_of_objects() {
        let err = OrgRecord::batch_from_json(r#"{"Name": "OSD"}"#).unwrap_err();
        assert!(matches!(err, IngestError::InvalidRecord { kind: "org", .. }));

        let err = RoleRecord::batch_from_json(r#"[{"Name": "Secretary"}, "oops"]"#).unwrap_err();
        assert!(matches!(err, IngestError::InvalidRecord { kind: "role", .. }));

        let err = RoleRecord::batch_from_json(r#"[{"Parent": "Secretary"}]"#).unwrap_err();
        assert!(matches!(err, IngestError::MissingField { kind: "role", field: "Name" }));

        assert!(OrgRecord::batch_from_json("[]").unwrap().is_empty());
    }

    #[test]
    fn test_org_flags() {
        let orgs = OrgRecord::batch_from_json(
            r#"[{"Name": "Defense Logistics Agency", "DoDComponent": true, "OSDComponent": 0, "Head": "Director"}]"#,
        )
        .unwrap();
        assert!(orgs[0].dod_component);
        assert!(!orgs[0].osd_component);
        assert_eq!(orgs[0].head, "Director");
        assert_eq!(orgs[0].parent, "");
    }
}
