//! Typed property bags and the merge that applies them to a node

use crate::graph::{GraphTransaction, NodeId, PropertyValue, StoreResult};

/// One field value of a record
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Ordered list; empty is stored as an empty list
    TextList(Vec<String>),
    /// Removes the property
    Absent,
}

impl FieldValue {
    fn into_property(self) -> Option<PropertyValue> {
        match self {
            FieldValue::Text(s) => Some(PropertyValue::String(s)),
            FieldValue::Bool(b) => Some(PropertyValue::Boolean(b)),
            FieldValue::Int(i) => Some(PropertyValue::Integer(i)),
            FieldValue::Float(f) => Some(PropertyValue::Float(f)),
            FieldValue::TextList(items) => Some(PropertyValue::StringList(items)),
            FieldValue::Absent => None,
        }
    }
}

/// Ordered set of named fields for one node
///
/// ```
/// use docgraph::ingest::PropertyBag;
///
/// let bag = PropertyBag::new()
///     .text("name", "Chief of Staff")
///     .text("type", "role");
/// assert_eq!(bag.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    fields: Vec<(&'static str, FieldValue)>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, value: FieldValue) -> Self {
        self.fields.push((name, value));
        self
    }

    pub fn text(self, name: &'static str, value: impl Into<String>) -> Self {
        self.field(name, FieldValue::Text(value.into()))
    }

    pub fn boolean(self, name: &'static str, value: bool) -> Self {
        self.field(name, FieldValue::Bool(value))
    }

    pub fn int(self, name: &'static str, value: i64) -> Self {
        self.field(name, FieldValue::Int(value))
    }

    pub fn float(self, name: &'static str, value: f64) -> Self {
        self.field(name, FieldValue::Float(value))
    }

    pub fn list(self, name: &'static str, values: &[String]) -> Self {
        self.field(name, FieldValue::TextList(values.to_vec()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, FieldValue)> {
        self.fields.iter()
    }
}

/// Apply every field of `bag` to `node`, returning the number applied
///
/// Each field counts once whether or not the stored value changed.
pub fn merge_properties<T: GraphTransaction>(tx: &mut T, node: NodeId, bag: PropertyBag) -> StoreResult<usize> {
    let mut applied = 0;
    for (name, value) in bag.fields {
        match value.into_property() {
            Some(value) => tx.set_node_property(node, name, value)?,
            None => tx.remove_node_property(node, name)?,
        }
        applied += 1;
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphDatabase, Label, MemoryGraph};

    #[test]
    fn test_merge_sets_typed_values() {
        let graph = MemoryGraph::new();
        let mut tx = graph.begin().unwrap();
        let doc = tx.create_node(&Label::new("Document")).unwrap();

        let bag = PropertyBag::new()
            .text("doc_id", "AGO 1976-02.pdf_0")
            .int("page_count", 6)
            .float("pagerank_r", 3.5e-5)
            .boolean("is_revoked_b", false)
            .list("ref_list", &["AR 672-3".to_string()]);
        assert_eq!(merge_properties(&mut tx, doc, bag).unwrap(), 5);

        let node = tx.node(doc).unwrap();
        assert_eq!(node.get_property("page_count"), Some(&PropertyValue::Integer(6)));
        assert_eq!(node.get_property("is_revoked_b"), Some(&PropertyValue::Boolean(false)));
        assert_eq!(
            node.get_property("ref_list").and_then(|v| v.as_string_list()),
            Some(&["AR 672-3".to_string()][..])
        );
    }

    #[test]
    fn test_empty_list_differs_from_absent() {
        let graph = MemoryGraph::new();
        let mut tx = graph.begin().unwrap();
        let doc = tx.create_node(&Label::new("Document")).unwrap();

        merge_properties(&mut tx, doc, PropertyBag::new().list("keyw_5", &[]).text("author", "NA")).unwrap();
        assert_eq!(tx.node_property(doc, "keyw_5").unwrap(), Some(PropertyValue::StringList(vec![])));

        let applied = merge_properties(&mut tx, doc, PropertyBag::new().field("author", FieldValue::Absent)).unwrap();
        assert_eq!(applied, 1);
        assert_eq!(tx.node_property(doc, "author").unwrap(), None);
    }

    #[test]
    fn test_unchanged_values_still_count() {
        let graph = MemoryGraph::new();
        let mut tx = graph.begin().unwrap();
        let role = tx.create_node(&Label::new("Role")).unwrap();
        let bag = PropertyBag::new().text("name", "Chief of Staff").text("type", "role");

        assert_eq!(merge_properties(&mut tx, role, bag.clone()).unwrap(), 2);
        assert_eq!(merge_properties(&mut tx, role, bag).unwrap(), 2);
        assert_eq!(tx.node(role).unwrap().property_count(), 2);
    }
}
