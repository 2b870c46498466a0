//! Node kinds, natural keys and relationship types of the document graph

use crate::graph::{EdgeType, GraphStore, Label, MemoryGraph};

/// Record kinds stored as nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    /// Placeholder for a citation no ingested document answers to
    UnknownDocument,
    Topic,
    Entity,
    Org,
    Role,
    DocType,
}

impl NodeKind {
    pub const ALL: [NodeKind; 7] = [
        NodeKind::Document,
        NodeKind::UnknownDocument,
        NodeKind::Topic,
        NodeKind::Entity,
        NodeKind::Org,
        NodeKind::Role,
        NodeKind::DocType,
    ];

    pub fn label_name(&self) -> &'static str {
        match self {
            NodeKind::Document => "Document",
            NodeKind::UnknownDocument => "UKN_Document",
            NodeKind::Topic => "Topic",
            NodeKind::Entity => "Entity",
            NodeKind::Org => "Org",
            NodeKind::Role => "Role",
            NodeKind::DocType => "DocType",
        }
    }

    pub fn label(&self) -> Label {
        Label::new(self.label_name())
    }

    /// The property that identifies a node of this kind
    pub fn key_property(&self) -> &'static str {
        match self {
            NodeKind::Document | NodeKind::UnknownDocument => "doc_id",
            _ => "name",
        }
    }
}

/// Relationship types written by the drivers and the reference pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelType {
    ChildOf,
    RelatedTo,
    Contains,
    IsIn,
    Mentions,
    TypeOf,
    HasHead,
    References,
    ReferencesUnknown,
}

impl RelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelType::ChildOf => "CHILD_OF",
            RelType::RelatedTo => "RELATED_TO",
            RelType::Contains => "CONTAINS",
            RelType::IsIn => "IS_IN",
            RelType::Mentions => "MENTIONS",
            RelType::TypeOf => "TYPE_OF",
            RelType::HasHead => "HAS_HEAD",
            RelType::References => "REFERENCES",
            RelType::ReferencesUnknown => "REFERENCES_UKN",
        }
    }

    pub fn edge_type(&self) -> EdgeType {
        EdgeType::new(self.as_str())
    }
}

/// Index every natural key of the schema on `store`
pub fn install_key_indices(store: &mut GraphStore) {
    for kind in NodeKind::ALL {
        store.create_key_index(kind.label(), kind.key_property());
    }
}

impl MemoryGraph {
    /// Empty graph with every natural key indexed
    pub fn indexed() -> Self {
        let mut store = GraphStore::new();
        install_key_indices(&mut store);
        MemoryGraph::with_store(store)
    }
}
