use anyhow::{Context, Result};
use dorg_governance::{GovernanceConfig, GovernanceManager, InMemoryGovernance, LocalChain};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything the CLI keeps between runs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeState {
    pub governance: InMemoryGovernance,
    pub chain: LocalChain,
}

impl NodeState {
    /// Load state from disk. A missing file is a fresh state.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No state at {}, starting fresh", path.display());
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read state from {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("failed to parse state in {}", path.display()))
    }

    /// Save state to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize state")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write state to {}", path.display()))
    }

    pub fn into_manager(
        self,
        config: GovernanceConfig,
    ) -> GovernanceManager<InMemoryGovernance, LocalChain> {
        GovernanceManager::new(self.governance, self.chain, config)
    }

    pub fn from_manager(manager: GovernanceManager<InMemoryGovernance, LocalChain>) -> Self {
        let (governance, chain) = manager.into_parts();
        Self { governance, chain }
    }
}
