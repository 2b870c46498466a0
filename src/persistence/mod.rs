//! Snapshot persistence for the in-memory graph

pub mod snapshot;

pub use snapshot::{load_snapshot, save_snapshot, PersistenceError, PersistenceResult, SNAPSHOT_FORMAT_VERSION};
