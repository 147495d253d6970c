//! Configuration loading and management
//!
//! Handles parsing of the optional `<data_dir>/config.toml` file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::query::DEFAULT_LIMIT;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Owner configuration
    #[serde(default)]
    pub owner: OwnerConfig,

    /// Query defaults
    #[serde(default)]
    pub query: QueryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            owner: OwnerConfig::default(),
            query: QueryConfig::default(),
        }
    }
}

/// Owner-related configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnerConfig {
    /// Fallback owner when neither --owner, TD_OWNER, nor the persisted
    /// owner file resolves one
    #[serde(default)]
    pub default: Option<String>,
}

/// Query-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Default page size for `td list`
    #[serde(default = "default_limit")]
    pub default_limit: u64,

    /// Default sort spec for `td list` (`field` or `field:direction`)
    #[serde(default = "default_sort")]
    pub default_sort: String,
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

fn default_sort() -> String {
    "createdAt:desc".to_string()
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            default_sort: default_sort(),
        }
    }
}

impl Config {
    /// Load configuration from a file. A missing file yields defaults;
    /// a malformed file is an `InvalidConfig` error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|err| Error::InvalidConfig(format!("{}: {err}", path.display())))
    }
}
