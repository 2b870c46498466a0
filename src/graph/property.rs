//! Property value types for graph nodes and edges
//!
//! List properties are homogeneous: the only list shape the ingestion
//! records produce is an ordered list of strings, so that is the only list
//! variant. An empty list is a stored value, distinct from an absent
//! property.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A stored property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    StringList(Vec<String>),
}

impl PropertyValue {
    /// Get string value if this is a string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get integer value if this is an integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get float value if this is a float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get boolean value if this is a boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the list if this is a string list
    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            PropertyValue::StringList(items) => Some(items),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "String",
            PropertyValue::Integer(_) => "Integer",
            PropertyValue::Float(_) => "Float",
            PropertyValue::Boolean(_) => "Boolean",
            PropertyValue::StringList(_) => "StringList",
        }
    }

    /// Plain JSON form; a non-finite float becomes `null`
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            PropertyValue::String(s) => serde_json::Value::from(s.as_str()),
            PropertyValue::Integer(i) => serde_json::Value::from(*i),
            PropertyValue::Float(f) => serde_json::Value::from(*f),
            PropertyValue::Boolean(b) => serde_json::Value::from(*b),
            PropertyValue::StringList(items) => serde_json::Value::from(items.clone()),
        }
    }
}

/// JSON object of a property map, keeping property order
pub fn properties_to_json(properties: &PropertyMap) -> serde_json::Map<String, serde_json::Value> {
    properties.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "\"{}\"", s),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Float(fl) => write!(f, "{}", fl),
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::StringList(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "\"{}\"", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Boolean(b)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(items: Vec<String>) -> Self {
        PropertyValue::StringList(items)
    }
}

/// Property map for nodes and edges, kept in insertion order
pub type PropertyMap = IndexMap<String, PropertyValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_json_is_untagged() {
        let mut props = PropertyMap::new();
        props.insert("doc_id".to_string(), "AGO 1976-02.pdf_0".into());
        props.insert("page_count".to_string(), 6i64.into());
        props.insert("keyw_5".to_string(), PropertyValue::StringList(vec![]));
        props.insert("score".to_string(), f64::NAN.into());

        let json = serde_json::Value::Object(properties_to_json(&props));
        assert_eq!(
            json,
            serde_json::json!({"doc_id": "AGO 1976-02.pdf_0", "page_count": 6, "keyw_5": [], "score": null})
        );
    }

    #[test]
    fn test_accessors_match_variant() {
        let title: PropertyValue = "HQDA GENERAL ORDERS".into();
        assert_eq!(title.as_string(), Some("HQDA GENERAL ORDERS"));
        assert_eq!(title.as_integer(), None);

        assert_eq!(PropertyValue::from(6i64).as_integer(), Some(6));
        assert_eq!(PropertyValue::from(0.25).as_float(), Some(0.25));
        assert_eq!(PropertyValue::from(false).as_boolean(), Some(false));
    }

    #[test]
    fn test_empty_list_is_a_value() {
        let empty = PropertyValue::from(Vec::<String>::new());
        assert_eq!(empty.as_string_list(), Some(&[][..]));
        assert_eq!(empty.type_name(), "StringList");
        assert_eq!(empty.to_string(), "[]");
    }

    #[test]
    fn test_display_list() {
        let refs = PropertyValue::from(vec!["AR 672-3".to_string(), "AR 672-31".to_string()]);
        assert_eq!(refs.to_string(), "[\"AR 672-3\", \"AR 672-31\"]");
    }
}
