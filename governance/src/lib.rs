//! DORG Governance Module
//!
//! Implements the governance core of decentralized organizations:
//! - Organization registry with executors and a bound voting system
//! - Proposal store scoped per organization
//! - Coin, Conviction and PLCR (commit/reveal) voting strategies
//! - Proposal lifecycle: decisions, closing and dispatch of passed calls
//!
//! The core is a synchronous state-transition engine. Chain height, token
//! supply and call execution are supplied by the host through [`ChainFacade`].

pub mod chain;
pub mod config;
pub mod error;
pub mod manager;
pub mod organization;
pub mod proposal;
pub mod storage;
pub mod voting;

pub use chain::{ChainFacade, LocalChain};
pub use config::GovernanceConfig;
pub use error::{GovernanceError, Result};
pub use manager::{CloseOutcome, ClosedReason, Evaluation, GovernanceManager};
pub use organization::OrganizationDetails;
pub use proposal::Proposal;
pub use storage::{GovernanceStore, InMemoryGovernance};
pub use voting::{
    CoinParameters, ConvictionParameters, Decision, PlcrEntry, PlcrParameters,
    VoteCountingStrategy, VotingState, VotingStrategy, VotingSystem, VotingSystemId,
};

pub use dorg_crypto::Commitment;

/// Account identifiers (voters, executors) are opaque strings.
pub type AccountId = String;

/// Sequence-derived organization address (64-char hex).
pub type OrganizationId = String;

/// Content-derived proposal key (64-char hex).
pub type ProposalId = String;

/// Token amounts. Supplies in the 10^18+ range are common.
pub type Balance = u128;

/// Chain height.
pub type BlockNumber = u64;

/// Identifier of the currency used to weigh votes. Zero is reserved.
pub type CurrencyId = u32;
