//! Support code for the `dorg` binary: configuration and persisted node state.

pub mod config;
pub mod state;

pub use config::{load_config, CliConfig, NodeConfig};
pub use state::NodeState;
