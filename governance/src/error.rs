//! Governance error types

use thiserror::Error;

use crate::manager::ClosedReason;
use crate::{AccountId, BlockNumber, OrganizationId, ProposalId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid voting system: {0}")]
    InvalidVotingSystem(String),

    /// Stored voting data cannot be routed to a strategy. Indicates corruption.
    #[error("Unknown voting system for proposal {proposal}: {reason}")]
    UnknownVotingSystem { proposal: ProposalId, reason: String },

    #[error("Reveal from {0} does not match the committed hash")]
    RevealMismatch(AccountId),

    /// `closed` is set when the failed call belonged to a closed proposal.
    #[error("Dispatch failed for organization {org}: {reason}")]
    DispatchFailed {
        org: OrganizationId,
        reason: String,
        closed: Option<ClosedReason>,
    },

    #[error("Invalid organization: {0}")]
    InvalidOrganization(String),

    #[error("Maximum number of organizations created")]
    CreatedOrganizationsOverflow,

    #[error("Duplicated proposal: {0}")]
    DuplicatedProposal(ProposalId),

    #[error("Decision does not fit voting system: {0}")]
    DecisionMismatch(String),

    #[error("No commit found for {0}")]
    NoCommitFound(AccountId),

    #[error("Vote from {0} was already revealed")]
    AlreadyRevealed(AccountId),

    #[error("{decision} not accepted at height {now}: {window}")]
    Phase {
        decision: &'static str,
        now: BlockNumber,
        window: String,
    },

    #[error("Too many voters: at most {max} allowed")]
    TooManyVoters { max: usize },

    #[error("Unauthorized: {0}")]
    Unauthorized(AccountId),
}

impl GovernanceError {
    pub fn organization_not_found(id: &str) -> Self {
        Self::NotFound(format!("organization {}", id))
    }

    pub fn proposal_not_found(id: &str) -> Self {
        Self::NotFound(format!("proposal {}", id))
    }
}

pub type Result<T> = std::result::Result<T, GovernanceError>;
