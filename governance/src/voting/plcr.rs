//! Partial-lock commit/reveal (PLCR) voting.
//!
//! Voters first commit to the hash of `(power, in_support, salt)` and later
//! reveal the tuple. Only revealed votes are tallied. The hash is
//! [`Commitment::of_vote`], so any party using the same canonical encoding
//! can produce a commitment that reveals here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::threshold::exceeds_percent_of;
use super::{Decision, VotingStrategy};
use crate::error::{GovernanceError, Result};
use crate::{AccountId, Balance, BlockNumber, CurrencyId};
use dorg_crypto::Commitment;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlcrParameters {
    /// Length of the commit phase, in blocks.
    pub commit_duration: BlockNumber,
    /// Length of the reveal phase that follows it.
    pub reveal_duration: BlockNumber,
    pub voting_currency: CurrencyId,
    pub min_quorum: u32,
    pub min_participation: u32,
}

/// Per-voter progress. Voters with no entry have not committed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlcrEntry {
    Committed(Commitment),
    Revealed {
        power: Balance,
        in_support: bool,
        salt: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlcrVoting {
    pub parameters: PlcrParameters,
    pub entries: BTreeMap<AccountId, PlcrEntry>,
    pub revealed_favorable: Balance,
    pub revealed_against: Balance,
}

impl PlcrVoting {
    pub fn new(parameters: PlcrParameters) -> Self {
        Self {
            parameters,
            entries: BTreeMap::new(),
            revealed_favorable: 0,
            revealed_against: 0,
        }
    }

    /// End of the commit phase. Commits stop before it, reveals start after it.
    pub fn commit_phase_ends_on(&self, created_on: BlockNumber) -> BlockNumber {
        created_on.saturating_add(self.parameters.commit_duration)
    }

    /// End of the reveal phase. Reveals stop before it, expiry starts after it.
    pub fn reveal_phase_ends_on(&self, created_on: BlockNumber) -> BlockNumber {
        self.commit_phase_ends_on(created_on)
            .saturating_add(self.parameters.reveal_duration)
    }

    fn commit(&mut self, voter: &str, commitment: Commitment) -> Result<()> {
        if let Some(PlcrEntry::Revealed { .. }) = self.entries.get(voter) {
            return Err(GovernanceError::AlreadyRevealed(voter.to_string()));
        }
        self.entries
            .insert(voter.to_string(), PlcrEntry::Committed(commitment));
        Ok(())
    }

    fn reveal(&mut self, voter: &str, power: Balance, in_support: bool, salt: u64) -> Result<()> {
        let committed = match self.entries.get(voter) {
            Some(PlcrEntry::Committed(commitment)) => *commitment,
            _ => return Err(GovernanceError::NoCommitFound(voter.to_string())),
        };
        if Commitment::of_vote(power, in_support, salt) != committed {
            return Err(GovernanceError::RevealMismatch(voter.to_string()));
        }

        if in_support {
            self.revealed_favorable = self.revealed_favorable.saturating_add(power);
        } else {
            self.revealed_against = self.revealed_against.saturating_add(power);
        }
        self.entries.insert(
            voter.to_string(),
            PlcrEntry::Revealed {
                power,
                in_support,
                salt,
            },
        );
        Ok(())
    }
}

impl VotingStrategy for PlcrVoting {
    fn record_decision(&mut self, voter: &str, decision: Decision) -> Result<()> {
        match decision {
            Decision::Commit(commitment) => self.commit(voter, commitment),
            Decision::Reveal {
                power,
                in_support,
                salt,
            } => self.reveal(voter, power, in_support, salt),
            Decision::Vote { .. } => Err(GovernanceError::DecisionMismatch(
                "plcr voting expects a commit or a reveal, got vote".to_string(),
            )),
        }
    }

    fn is_passing(&self, total_supply: Balance) -> bool {
        let participation = self
            .revealed_favorable
            .saturating_add(self.revealed_against);
        let enough_participation =
            exceeds_percent_of(participation, self.parameters.min_participation, total_supply);
        let enough_quorum =
            exceeds_percent_of(self.revealed_favorable, self.parameters.min_quorum, participation);
        enough_participation && enough_quorum
    }

    fn is_expired(&self, created_on: BlockNumber, now: BlockNumber) -> bool {
        now > self.reveal_phase_ends_on(created_on)
    }

    fn voter_count(&self) -> usize {
        self.entries.len()
    }

    fn has_voter(&self, voter: &str) -> bool {
        self.entries.contains_key(voter)
    }

    /// Commits are taken while `now < commit_end`, reveals while
    /// `commit_end < now < reveal_end`.
    fn check_phase(
        &self,
        decision: &Decision,
        created_on: BlockNumber,
        now: BlockNumber,
    ) -> Result<()> {
        let commit_end = self.commit_phase_ends_on(created_on);
        let reveal_end = self.reveal_phase_ends_on(created_on);
        let (open, window) = match decision {
            Decision::Commit(_) => (
                now < commit_end,
                format!("commits are accepted before height {}", commit_end),
            ),
            Decision::Reveal { .. } => (
                commit_end < now && now < reveal_end,
                format!(
                    "reveals are accepted after height {} and before height {}",
                    commit_end, reveal_end
                ),
            ),
            // Rejected as a mismatch by record_decision
            Decision::Vote { .. } => return Ok(()),
        };

        if open {
            Ok(())
        } else {
            Err(GovernanceError::Phase {
                decision: decision.kind(),
                now,
                window,
            })
        }
    }
}
