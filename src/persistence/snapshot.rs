//! Whole-graph snapshots
//!
//! A snapshot is the bincode encoding of every node and edge in id order
//! plus the key index definitions. Writes go to a sibling temp file that is
//! renamed over the target, so a crash never leaves a half-written
//! snapshot behind.

use crate::graph::{Edge, GraphStore, Label, Node, StoreError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Bumped whenever the encoded layout changes
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Unsupported snapshot format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Corrupt snapshot: {0}")]
    Corrupt(#[from] StoreError),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

#[derive(Debug, Serialize, Deserialize)]
struct GraphSnapshot {
    format_version: u32,
    key_indices: Vec<(Label, String)>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl GraphSnapshot {
    fn capture(store: &GraphStore) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            key_indices: store.key_index_definitions(),
            nodes: store.all_nodes().cloned().collect(),
            edges: store.all_edges().cloned().collect(),
        }
    }

    fn restore(self) -> PersistenceResult<GraphStore> {
        if self.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: self.format_version,
                expected: SNAPSHOT_FORMAT_VERSION,
            });
        }
        let mut store = GraphStore::new();
        // Indices first so recovered nodes are indexed as they arrive
        for (label, key) in self.key_indices {
            store.create_key_index(label, key);
        }
        for node in self.nodes {
            store.insert_recovered_node(node)?;
        }
        for edge in self.edges {
            store.insert_recovered_edge(edge)?;
        }
        Ok(store)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `store` to `path`, creating parent directories as needed
pub fn save_snapshot(store: &GraphStore, path: impl AsRef<Path>) -> PersistenceResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let snapshot = GraphSnapshot::capture(store);
    let tmp = temp_path(path);
    {
        let mut writer = BufWriter::new(fs::File::create(&tmp)?);
        bincode::serialize_into(&mut writer, &snapshot)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }
    fs::rename(&tmp, path)?;

    info!(
        "Saved snapshot with {} nodes and {} edges to {:?}",
        snapshot.nodes.len(),
        snapshot.edges.len(),
        path
    );
    Ok(())
}

/// Read the snapshot at `path`; a missing file is an empty graph
pub fn load_snapshot(path: impl AsRef<Path>) -> PersistenceResult<GraphStore> {
    let path = path.as_ref();
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No snapshot at {:?}, starting empty", path);
            return Ok(GraphStore::new());
        }
        Err(e) => return Err(e.into()),
    };

    let snapshot: GraphSnapshot = bincode::deserialize_from(BufReader::new(file))?;
    let store = snapshot.restore()?;
    info!(
        "Loaded snapshot with {} nodes and {} edges from {:?}",
        store.node_count(),
        store.edge_count(),
        path
    );
    Ok(store)
}
