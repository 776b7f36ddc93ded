//! Organization registry
//!
//! Organizations are append-only: once created, their executors and voting
//! system never change.

use serde::{Deserialize, Serialize};

use crate::config::GovernanceConfig;
use crate::error::{GovernanceError, Result};
use crate::storage::GovernanceStore;
use crate::voting::VotingSystem;
use crate::{AccountId, OrganizationId};

const ORGANIZATION_DOMAIN: &[u8] = b"dorg/orgs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationDetails {
    /// Accounts allowed to act for the organization directly and to veto
    /// its proposals. Sorted, no duplicates.
    pub executors: Vec<AccountId>,
    /// Voting system every proposal of the organization uses.
    pub voting: VotingSystem,
}

impl OrganizationDetails {
    pub fn new(mut executors: Vec<AccountId>, voting: VotingSystem) -> Self {
        executors.sort();
        executors.dedup();
        Self { executors, voting }
    }

    pub fn is_executor(&self, account: &str) -> bool {
        self.executors
            .binary_search_by(|e| e.as_str().cmp(account))
            .is_ok()
    }
}

/// Address of the `counter`-th organization.
pub fn derive_organization_id(counter: u32) -> OrganizationId {
    dorg_crypto::derive_id(ORGANIZATION_DOMAIN, &[&counter.to_be_bytes()])
}

/// Validate and register a new organization.
pub fn create_organization<S: GovernanceStore>(
    store: &mut S,
    config: &GovernanceConfig,
    executors: Vec<AccountId>,
    voting: VotingSystem,
) -> Result<OrganizationId> {
    voting.validate()?;
    let details = OrganizationDetails::new(executors, voting);
    if details.executors.len() > config.max_executors {
        return Err(GovernanceError::InvalidOrganization(format!(
            "{} executors, at most {} allowed",
            details.executors.len(),
            config.max_executors
        )));
    }

    let counter = store
        .organizations_created()
        .checked_add(1)
        .ok_or(GovernanceError::CreatedOrganizationsOverflow)?;
    // Bump first so an id is never handed out twice
    store.set_organizations_created(counter);

    let id = derive_organization_id(counter);
    store.put_organization(id.clone(), details);
    Ok(id)
}

pub fn get_organization<S: GovernanceStore>(store: &S, id: &str) -> Result<OrganizationDetails> {
    store
        .get_organization(id)
        .ok_or_else(|| GovernanceError::organization_not_found(id))
}
