use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::organization::OrganizationDetails;
use crate::proposal::Proposal;
use crate::OrganizationId;

/// Abstraction for governance persistence.
/// Swap this out for your chain runtime, sled/rocks, or DB-backed store.
pub trait GovernanceStore {
    // Organizations
    fn put_organization(&mut self, id: OrganizationId, details: OrganizationDetails);
    fn get_organization(&self, id: &str) -> Option<OrganizationDetails>;
    fn list_organizations(&self) -> Vec<(OrganizationId, OrganizationDetails)>;

    // Counters
    fn organizations_created(&self) -> u32;
    fn set_organizations_created(&mut self, count: u32);
    fn next_proposal_nonce(&mut self) -> u64;

    // Proposals
    fn put_proposal(&mut self, proposal: Proposal);
    fn get_proposal(&self, id: &str) -> Option<Proposal>;
    fn take_proposal(&mut self, id: &str) -> Option<Proposal>;
    fn contains_proposal(&self, id: &str) -> bool;
    fn proposals_by_org(&self, org: &str) -> Vec<Proposal>;
}

/// Simple in-memory store (good for testing and initial wiring).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryGovernance {
    organizations_created: u32,
    next_nonce: u64,
    organizations: BTreeMap<OrganizationId, OrganizationDetails>,
    proposals: BTreeMap<String, Proposal>,
}

impl InMemoryGovernance {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GovernanceStore for InMemoryGovernance {
    fn put_organization(&mut self, id: OrganizationId, details: OrganizationDetails) {
        self.organizations.insert(id, details);
    }

    fn get_organization(&self, id: &str) -> Option<OrganizationDetails> {
        self.organizations.get(id).cloned()
    }

    fn list_organizations(&self) -> Vec<(OrganizationId, OrganizationDetails)> {
        self.organizations
            .iter()
            .map(|(id, details)| (id.clone(), details.clone()))
            .collect()
    }

    fn organizations_created(&self) -> u32 {
        self.organizations_created
    }

    fn set_organizations_created(&mut self, count: u32) {
        self.organizations_created = count;
    }

    fn next_proposal_nonce(&mut self) -> u64 {
        let nonce = self.next_nonce;
        self.next_nonce = self.next_nonce.wrapping_add(1);
        nonce
    }

    fn put_proposal(&mut self, proposal: Proposal) {
        self.proposals.insert(proposal.id.clone(), proposal);
    }

    fn get_proposal(&self, id: &str) -> Option<Proposal> {
        self.proposals.get(id).cloned()
    }

    fn take_proposal(&mut self, id: &str) -> Option<Proposal> {
        self.proposals.remove(id)
    }

    fn contains_proposal(&self, id: &str) -> bool {
        self.proposals.contains_key(id)
    }

    fn proposals_by_org(&self, org: &str) -> Vec<Proposal> {
        // BTreeMap iteration keeps the result sorted by id
        self.proposals
            .values()
            .filter(|p| p.org == org)
            .cloned()
            .collect()
    }
}
