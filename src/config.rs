//! Runtime configuration
//!
//! Settings come from three layers, later ones winning: a YAML file, the
//! `DOCGRAPH_*` environment variables, and command-line flags (applied by
//! the CLI). Every field has a default, so an empty file is valid.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding [`DocgraphConfig::snapshot_path`]
pub const ENV_SNAPSHOT: &str = "DOCGRAPH_SNAPSHOT";
/// Environment variable overriding [`DocgraphConfig::log_level`]
pub const ENV_LOG: &str = "DOCGRAPH_LOG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocgraphConfig {
    /// Graph snapshot read before and written after each command
    pub snapshot_path: PathBuf,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for DocgraphConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("./docgraph_data/graph.snapshot"),
            log_level: "info".to_string(),
        }
    }
}

impl DocgraphConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Load a YAML config file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, or the file at `path` when given, with the environment applied
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_SNAPSHOT).filter(|v| !v.is_empty()) {
            self.snapshot_path = PathBuf::from(path);
        }
        if let Some(level) = lookup(ENV_LOG).filter(|v| !v.is_empty()) {
            self.log_level = level;
        }
    }
}
