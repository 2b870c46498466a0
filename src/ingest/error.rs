//! Ingestion errors

use crate::graph::StoreError;
use thiserror::Error;

/// Errors that abort an ingestion call
///
/// Any of these means the unit of work was rolled back and the graph is
/// unchanged. Optional fields with a missing or unexpected shape are not
/// errors; they fall back to empty values during parsing.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Input is not JSON at all
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON of the wrong shape for the record kind
    #[error("Invalid {kind} record: {reason}")]
    InvalidRecord { kind: &'static str, reason: String },

    /// A field that identifies the record is missing
    #[error("{kind} record is missing required field `{field}`")]
    MissingField { kind: &'static str, field: &'static str },

    /// Store failure at the graph boundary
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl IngestError {
    pub fn invalid(kind: &'static str, reason: impl Into<String>) -> Self {
        IngestError::InvalidRecord {
            kind,
            reason: reason.into(),
        }
    }

    /// True for errors caused by the input rather than the store
    pub fn is_parse_error(&self) -> bool {
        !matches!(self, IngestError::Store(_))
    }
}

pub type IngestResult<T> = Result<T, IngestError>;
