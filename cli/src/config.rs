use anyhow::{Context, Result};
use dorg_governance::GovernanceConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_STATE_FILE: &str = "dorg-state.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub governance: GovernanceConfig,
    #[serde(default)]
    pub node: NodeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// JSON file holding organizations, proposals and the local chain.
    pub state_file: PathBuf,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
        }
    }
}

impl CliConfig {
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid configuration")
    }
}

/// Read the TOML configuration at `path`. Without a path, or when the file
/// cannot be used, defaults are returned and a warning is logged.
pub fn load_config(path: Option<&Path>) -> CliConfig {
    let Some(path) = path else {
        return CliConfig::default();
    };

    let loaded = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))
        .and_then(|contents| CliConfig::parse(&contents));
    match loaded {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Using default configuration: {:#}", e);
            CliConfig::default()
        }
    }
}
