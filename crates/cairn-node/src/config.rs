//! Configuration types for cairn-node

use crate::cli::Cli;
use anyhow::{Context, Result};
use cairn_core::ReaderConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Node configuration, loaded from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// RocksDB directory
    pub db_path: PathBuf,
    /// Archive directory; no archive when unset
    pub archive_dir: Option<PathBuf>,
    /// Default log level
    pub log_level: String,
    /// Emit logs as JSON
    pub log_json: bool,
    /// Reader settings
    pub reader: ReaderConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data"),
            archive_dir: None,
            log_level: "info".to_string(),
            log_json: false,
            reader: ReaderConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Read a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Build the effective config: file (if any), then CLI overrides
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(db_path) = &cli.db_path {
            config.db_path = db_path.clone();
        }
        if let Some(archive_dir) = &cli.archive_dir {
            config.archive_dir = Some(archive_dir.clone());
        }
        if let Some(level) = &cli.log_level {
            config.log_level = level.clone();
        }
        config.log_json |= cli.log_json;
        Ok(config)
    }
}
