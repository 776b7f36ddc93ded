//! Proposal lifecycle
//!
//! [`GovernanceManager`] ties the registry, the proposal store and the voting
//! strategies together and talks to the host chain through a
//! [`ChainFacade`]. Every operation runs to completion and leaves the store
//! untouched when it fails.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::chain::ChainFacade;
use crate::config::GovernanceConfig;
use crate::error::{GovernanceError, Result};
use crate::organization::{self, OrganizationDetails};
use crate::proposal::Proposal;
use crate::storage::GovernanceStore;
use crate::voting::{Decision, VotingSystem};
use crate::{AccountId, Balance, BlockNumber, OrganizationId, ProposalId};

/// Snapshot of a proposal's standing at a given height and supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub passing: bool,
    pub expired: bool,
}

/// Why a proposal was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClosedReason {
    Passed,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseOutcome {
    Closed(ClosedReason),
    NotYetClosable,
}

/// Governance manager over a store and a host chain
pub struct GovernanceManager<S: GovernanceStore, C: ChainFacade> {
    store: S,
    chain: C,
    config: GovernanceConfig,
}

impl<S: GovernanceStore, C: ChainFacade> GovernanceManager<S, C> {
    /// Create a new governance manager
    pub fn new(store: S, chain: C, config: GovernanceConfig) -> Self {
        Self {
            store,
            chain,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut C {
        &mut self.chain
    }

    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    /// Give back the store and the chain, e.g. to persist them
    pub fn into_parts(self) -> (S, C) {
        (self.store, self.chain)
    }

    // ------------------------------------------------------------------
    // Organizations
    // ------------------------------------------------------------------

    /// Register an organization bound to `voting`
    pub fn create_organization(
        &mut self,
        executors: Vec<AccountId>,
        voting: VotingSystem,
    ) -> Result<OrganizationId> {
        let system = voting.id();
        let id =
            organization::create_organization(&mut self.store, &self.config, executors, voting)?;
        info!("Created organization {} using {}", id, system);
        Ok(id)
    }

    /// Register an organization from a voting system tag and string parameters
    pub fn create_organization_from_tag(
        &mut self,
        executors: Vec<AccountId>,
        tag: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<OrganizationId> {
        let voting = VotingSystem::from_tag(tag, params)?;
        self.create_organization(executors, voting)
    }

    /// Get organization details
    pub fn organization(&self, id: &str) -> Result<OrganizationDetails> {
        organization::get_organization(&self.store, id)
    }

    /// Let an executor dispatch `call` for the organization without a vote
    pub fn apply_as(&mut self, caller: &str, org: &str, call: &[u8]) -> Result<()> {
        let details = self.organization(org)?;
        if !details.is_executor(caller) {
            return Err(GovernanceError::Unauthorized(caller.to_string()));
        }

        let origin = org.to_string();
        self.chain.dispatch(&origin, call).map_err(|reason| {
            warn!("Direct dispatch by {} for {} failed: {}", caller, org, reason);
            GovernanceError::DispatchFailed {
                org: origin.clone(),
                reason,
                closed: None,
            }
        })?;
        info!("Executor {} applied a call as {}", caller, org);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Proposals
    // ------------------------------------------------------------------

    /// Open a proposal to dispatch `call` on behalf of `org`
    ///
    /// The creation height is read from the chain.
    pub fn create_proposal(&mut self, org: &str, call: Vec<u8>) -> Result<ProposalId> {
        let details = self.organization(org)?;
        let created_on = self.chain.current_height();
        let nonce = self.store.next_proposal_nonce();

        let proposal = Proposal::new(org.to_string(), call, &details.voting, created_on, nonce);
        if self.store.contains_proposal(&proposal.id) {
            return Err(GovernanceError::DuplicatedProposal(proposal.id));
        }

        let id = proposal.id.clone();
        info!(
            "Created proposal {} for {} at height {} ({})",
            id, org, created_on, proposal.voting
        );
        self.store.put_proposal(proposal);
        Ok(id)
    }

    /// Get a proposal by ID
    pub fn proposal(&self, id: &str) -> Result<Proposal> {
        self.store
            .get_proposal(id)
            .ok_or_else(|| GovernanceError::proposal_not_found(id))
    }

    /// Proposals of an organization, sorted by ID
    pub fn proposals_of(&self, org: &str) -> Result<Vec<Proposal>> {
        self.organization(org)?;
        Ok(self.store.proposals_by_org(org))
    }

    /// Drop a proposal from the store. Removing twice is a caller bug.
    pub fn remove_proposal(&mut self, id: &str) -> Result<Proposal> {
        self.store
            .take_proposal(id)
            .ok_or_else(|| GovernanceError::proposal_not_found(id))
    }

    /// Record a voter's decision on a proposal
    ///
    /// The chain height is read once and checked against the decision's
    /// phase window, if the voting system has one.
    pub fn submit_decision(&mut self, id: &str, voter: &str, decision: Decision) -> Result<()> {
        let mut proposal = self.proposal(id)?;
        let kind = decision.kind();
        let max_voters = self.config.max_voters;
        let now = self.chain.current_height();
        let created_on = proposal.created_on;

        let strategy = proposal.strategy_mut()?;
        strategy.check_phase(&decision, created_on, now)?;
        if !strategy.has_voter(voter) && strategy.voter_count() >= max_voters {
            return Err(GovernanceError::TooManyVoters { max: max_voters });
        }
        strategy.record_decision(voter, decision)?;

        debug!("Recorded {} from {} on proposal {}", kind, voter, id);
        self.store.put_proposal(proposal);
        Ok(())
    }

    /// Evaluate a proposal against the supplied height and supply
    pub fn evaluate(
        &self,
        id: &str,
        now: BlockNumber,
        total_supply: Balance,
    ) -> Result<Evaluation> {
        let proposal = self.proposal(id)?;
        let strategy = proposal.strategy()?;
        Ok(Evaluation {
            passing: strategy.is_passing(total_supply),
            expired: strategy.is_expired(proposal.created_on, now),
        })
    }

    /// Close a proposal if it passed or expired
    ///
    /// Passing is checked before expiry. A closed proposal is removed from
    /// the store and its call is dispatched, whether it closed as
    /// [`ClosedReason::Passed`] or [`ClosedReason::Expired`]: an expired
    /// proposal executes its call even when its votes were against it. Hosts
    /// that must not run failed proposals should check [`Self::evaluate`]
    /// first or veto them. A failed dispatch is reported as
    /// [`GovernanceError::DispatchFailed`] carrying the close reason, after
    /// the removal.
    pub fn try_close(
        &mut self,
        id: &str,
        now: BlockNumber,
        total_supply: Balance,
    ) -> Result<CloseOutcome> {
        let evaluation = self.evaluate(id, now, total_supply)?;
        let reason = if evaluation.passing {
            ClosedReason::Passed
        } else if evaluation.expired {
            ClosedReason::Expired
        } else {
            debug!("Proposal {} is not closable at height {}", id, now);
            return Ok(CloseOutcome::NotYetClosable);
        };

        let proposal = self.remove_proposal(id)?;
        info!("Closing proposal {} of {}: {:?}", id, proposal.org, reason);

        if let Err(error) = self.chain.dispatch(&proposal.org, &proposal.call) {
            warn!("Dispatch of proposal {} failed: {}", id, error);
            return Err(GovernanceError::DispatchFailed {
                org: proposal.org,
                reason: error,
                closed: Some(reason),
            });
        }
        Ok(CloseOutcome::Closed(reason))
    }

    /// Close a proposal using the chain's current height and the supply of
    /// the proposal's voting currency
    pub fn close(&mut self, id: &str) -> Result<CloseOutcome> {
        let proposal = self.proposal(id)?;
        let now = self.chain.current_height();
        let total_supply = self.chain.total_issuance(proposal.state.voting_currency());
        self.try_close(id, now, total_supply)
    }

    /// Let an executor of the owning organization drop a proposal without
    /// dispatching it
    pub fn veto_proposal(&mut self, caller: &str, id: &str) -> Result<()> {
        let proposal = self.proposal(id)?;
        let details = self.organization(&proposal.org)?;
        if !details.is_executor(caller) {
            return Err(GovernanceError::Unauthorized(caller.to_string()));
        }

        self.remove_proposal(id)?;
        info!("Proposal {} vetoed by {}", id, caller);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::LocalChain;
    use crate::storage::InMemoryGovernance;
    use crate::voting::{CoinParameters, PlcrParameters, VoteCountingStrategy};

    fn manager() -> GovernanceManager<InMemoryGovernance, LocalChain> {
        GovernanceManager::new(
            InMemoryGovernance::new(),
            LocalChain::with_issuance(1, 1_000),
            GovernanceConfig {
                max_voters: 2,
                ..Default::default()
            },
        )
    }

    fn coin() -> VotingSystem {
        VotingSystem::Coin(CoinParameters {
            ttl: 10,
            voting_currency: 1,
            min_quorum: 50,
            min_participation: 33,
            vote_counting_strategy: VoteCountingStrategy::Simple,
        })
    }

    fn plcr() -> VotingSystem {
        VotingSystem::Plcr(PlcrParameters {
            commit_duration: 5,
            reveal_duration: 5,
            voting_currency: 1,
            min_quorum: 50,
            min_participation: 33,
        })
    }

    fn vote(power: Balance) -> Decision {
        Decision::Vote {
            in_support: true,
            power,
        }
    }

    #[test]
    fn test_voter_cap() {
        let mut manager = manager();
        let org = manager.create_organization(vec!["exec".into()], coin()).unwrap();
        let pid = manager.create_proposal(&org, b"call".to_vec()).unwrap();

        manager.submit_decision(&pid, "a", vote(1)).unwrap();
        manager.submit_decision(&pid, "b", vote(1)).unwrap();
        let err = manager.submit_decision(&pid, "c", vote(1)).unwrap_err();
        assert_eq!(err, GovernanceError::TooManyVoters { max: 2 });

        // Known voters can still change their mind
        manager.submit_decision(&pid, "a", vote(5)).unwrap();
    }

    #[test]
    fn test_failed_decision_leaves_proposal_untouched() {
        let mut manager = manager();
        let org = manager.create_organization(vec![], coin()).unwrap();
        let pid = manager.create_proposal(&org, vec![]).unwrap();
        let before = manager.proposal(&pid).unwrap();

        let commit = Decision::Commit(dorg_crypto::Commitment::of_vote(1, true, 1));
        assert!(manager.submit_decision(&pid, "a", commit).is_err());
        assert_eq!(manager.proposal(&pid).unwrap(), before);
    }

    #[test]
    fn test_same_call_gets_distinct_ids() {
        let mut manager = manager();
        let org = manager.create_organization(vec![], coin()).unwrap();
        let a = manager.create_proposal(&org, b"call".to_vec()).unwrap();
        let b = manager.create_proposal(&org, b"call".to_vec()).unwrap();
        assert_ne!(a, b);
        assert_eq!(manager.proposals_of(&org).unwrap().len(), 2);
    }

    #[test]
    fn test_remove_twice_fails() {
        let mut manager = manager();
        let org = manager.create_organization(vec![], coin()).unwrap();
        let pid = manager.create_proposal(&org, vec![]).unwrap();

        manager.remove_proposal(&pid).unwrap();
        assert!(matches!(
            manager.remove_proposal(&pid),
            Err(GovernanceError::NotFound(_))
        ));
    }

    #[test]
    fn test_close_reads_chain_state() {
        let mut manager = manager();
        let org = manager.create_organization(vec![], coin()).unwrap();
        let pid = manager.create_proposal(&org, b"call".to_vec()).unwrap();

        assert_eq!(manager.close(&pid).unwrap(), CloseOutcome::NotYetClosable);

        manager.submit_decision(&pid, "a", vote(400)).unwrap();
        assert_eq!(
            manager.close(&pid).unwrap(),
            CloseOutcome::Closed(ClosedReason::Passed)
        );
        assert_eq!(manager.chain().dispatched.len(), 1);
        assert_eq!(manager.chain().dispatched[0].origin, org);
    }

    #[test]
    fn test_decisions_outside_their_phase() {
        let mut manager = manager();
        let org = manager.create_organization(vec![], plcr()).unwrap();
        let pid = manager.create_proposal(&org, vec![]).unwrap();
        let commitment = dorg_crypto::Commitment::of_vote(400, true, 7);
        let reveal = Decision::Reveal {
            power: 400,
            in_support: true,
            salt: 7,
        };

        manager.submit_decision(&pid, "a", Decision::Commit(commitment)).unwrap();
        let before = manager.proposal(&pid).unwrap();

        // Commit phase ends at 5, reveals open at 6
        let err = manager.submit_decision(&pid, "a", reveal.clone()).unwrap_err();
        assert!(matches!(
            err,
            GovernanceError::Phase {
                decision: "reveal",
                now: 0,
                ..
            }
        ));
        manager.chain_mut().advance(5);
        assert!(manager.submit_decision(&pid, "a", reveal.clone()).is_err());
        assert_eq!(manager.proposal(&pid).unwrap(), before);

        manager.chain_mut().advance(1);
        let err = manager
            .submit_decision(&pid, "b", Decision::Commit(commitment))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::Phase { decision: "commit", now: 6, .. }));
        manager.submit_decision(&pid, "a", reveal).unwrap();
        let proposal = manager.proposal(&pid).unwrap();
        assert!(proposal.strategy().unwrap().is_passing(1_000));
    }
}
