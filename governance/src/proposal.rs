//! Proposal types

use serde::{Deserialize, Serialize};

use crate::error::{GovernanceError, Result};
use crate::voting::{VotingState, VotingStrategy, VotingSystem, VotingSystemId};
use crate::{BlockNumber, OrganizationId, ProposalId};

const PROPOSAL_DOMAIN: &[u8] = b"dorg/proposals";

/// A pending decision of an organization: an encoded call that is executed
/// once the proposal closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub org: OrganizationId,
    /// Opaque encoded call, dispatched with the organization as origin.
    #[serde(with = "hex_bytes")]
    pub call: Vec<u8>,
    /// Voting system this proposal is routed to. Never changes.
    pub voting: VotingSystemId,
    pub created_on: BlockNumber,
    /// Tallies for `voting`.
    pub state: VotingState,
}

impl Proposal {
    pub fn new(
        org: OrganizationId,
        call: Vec<u8>,
        system: &VotingSystem,
        created_on: BlockNumber,
        nonce: u64,
    ) -> Self {
        Self {
            id: derive_proposal_id(&org, &call, nonce),
            org,
            call,
            voting: system.id(),
            created_on,
            state: system.initial_state(),
        }
    }

    /// Strategy holding this proposal's tallies.
    pub fn strategy(&self) -> Result<&dyn VotingStrategy> {
        let voting = self.voting;
        let found = self.state.system_id();
        self.state
            .route(voting)
            .ok_or_else(|| unroutable(&self.id, voting, found))
    }

    pub fn strategy_mut(&mut self) -> Result<&mut dyn VotingStrategy> {
        let voting = self.voting;
        let found = self.state.system_id();
        match self.state.route_mut(voting) {
            Some(strategy) => Ok(strategy),
            None => Err(unroutable(&self.id, voting, found)),
        }
    }
}

fn unroutable(id: &str, voting: VotingSystemId, found: VotingSystemId) -> GovernanceError {
    log::warn!(
        "proposal {} is tagged {} but stores {} tallies",
        id,
        voting,
        found
    );
    GovernanceError::UnknownVotingSystem {
        proposal: id.to_string(),
        reason: format!("tagged {} but holds {} state", voting, found),
    }
}

/// Content-derived proposal key.
pub fn derive_proposal_id(org: &OrganizationId, call: &[u8], nonce: u64) -> ProposalId {
    dorg_crypto::derive_id(PROPOSAL_DOMAIN, &[org.as_bytes(), call, &nonce.to_be_bytes()])
}

/// Serde helper storing byte vectors as hex strings.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        hex::decode(raw.trim_start_matches("0x")).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voting::{CoinParameters, PlcrParameters, VoteCountingStrategy};

    fn coin() -> VotingSystem {
        VotingSystem::Coin(CoinParameters {
            ttl: 10,
            voting_currency: 1,
            min_quorum: 50,
            min_participation: 33,
            vote_counting_strategy: VoteCountingStrategy::Simple,
        })
    }

    #[test]
    fn test_id_depends_on_content() {
        let org = "org".to_string();
        let a = derive_proposal_id(&org, b"call", 0);
        assert_eq!(a, derive_proposal_id(&org, b"call", 0));
        assert_ne!(a, derive_proposal_id(&org, b"call", 1));
        assert_ne!(a, derive_proposal_id(&org, b"other", 0));
        assert_ne!(a, derive_proposal_id(&"org2".to_string(), b"call", 0));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_new_proposal_has_empty_tallies() {
        let proposal = Proposal::new("org".into(), b"call".to_vec(), &coin(), 7, 0);
        assert_eq!(proposal.voting, VotingSystemId::CoinVoting);
        assert_eq!(proposal.created_on, 7);
        assert_eq!(proposal.strategy().unwrap().voter_count(), 0);
    }

    #[test]
    fn test_mismatched_state_is_unroutable() {
        let mut proposal = Proposal::new("org".into(), vec![], &coin(), 0, 0);
        proposal.state = VotingSystem::Plcr(PlcrParameters {
            commit_duration: 1,
            reveal_duration: 1,
            voting_currency: 1,
            min_quorum: 50,
            min_participation: 33,
        })
        .initial_state();

        assert!(matches!(
            proposal.strategy(),
            Err(GovernanceError::UnknownVotingSystem { .. })
        ));
        assert!(proposal.strategy_mut().is_err());
    }

    #[test]
    fn test_call_serialized_as_hex() {
        let proposal = Proposal::new("org".into(), vec![0xde, 0xad], &coin(), 0, 0);
        let json = serde_json::to_string(&proposal).unwrap();
        assert!(json.contains("\"call\":\"dead\""));

        let back: Proposal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, proposal);
    }
}
