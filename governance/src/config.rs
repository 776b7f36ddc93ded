//! Governance configuration

use serde::{Deserialize, Serialize};

/// Default cap on executors per organization
pub const DEFAULT_MAX_EXECUTORS: usize = 100;

/// Default cap on distinct voters per proposal
pub const DEFAULT_MAX_VOTERS: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceConfig {
    /// Organizations with more executors are rejected.
    pub max_executors: usize,
    /// New voters beyond this count are rejected. Existing voters can still
    /// replace their decision.
    pub max_voters: usize,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            max_executors: DEFAULT_MAX_EXECUTORS,
            max_voters: DEFAULT_MAX_VOTERS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GovernanceConfig::default();
        assert_eq!(config.max_executors, 100);
        assert_eq!(config.max_voters, 1024);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GovernanceConfig = serde_json::from_str(r#"{"max_voters": 5}"#).unwrap();
        assert_eq!(config.max_voters, 5);
        assert_eq!(config.max_executors, DEFAULT_MAX_EXECUTORS);
    }
}
