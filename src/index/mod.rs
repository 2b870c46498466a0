//! Natural-key indexing
//!
//! Hash indices that let the store answer "find node by (label, key,
//! value)" without scanning every node of the label.

pub mod key_index;
pub mod manager;

pub use key_index::KeyIndex;
pub use manager::{IndexManager, KeyIndexKey};
