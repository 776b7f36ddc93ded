//! Coin voting: one coin staked is one vote, or its square root when the
//! organization opted for quadratic counting.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::threshold::exceeds_percent_of;
use super::{Decision, VoteCountingStrategy, VotingStrategy};
use crate::error::{GovernanceError, Result};
use crate::{AccountId, Balance, BlockNumber, CurrencyId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinParameters {
    /// Blocks after creation before the proposal can be closed as expired.
    pub ttl: BlockNumber,
    /// Currency whose holdings weigh the votes.
    pub voting_currency: CurrencyId,
    /// Percentage of participating votes that must be favorable.
    pub min_quorum: u32,
    /// Percentage of the currency's total supply that must have voted.
    pub min_participation: u32,
    #[serde(default)]
    pub vote_counting_strategy: VoteCountingStrategy,
}

/// One voter's latest decision, as staked (before strategy weighting).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastVote {
    pub in_support: bool,
    pub power: Balance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinVoting {
    pub parameters: CoinParameters,
    pub total_favorable: Balance,
    pub total_against: Balance,
    pub votes: BTreeMap<AccountId, CastVote>,
}

impl CoinVoting {
    pub fn new(parameters: CoinParameters) -> Self {
        Self {
            parameters,
            total_favorable: 0,
            total_against: 0,
            votes: BTreeMap::new(),
        }
    }

    /// Power actually counted for `power` staked coins.
    pub fn real_power(&self, power: Balance) -> Balance {
        match self.parameters.vote_counting_strategy {
            VoteCountingStrategy::Simple => power,
            VoteCountingStrategy::Quadratic => integer_sqrt(power),
        }
    }

    fn record_vote(&mut self, in_support: bool, power: Balance) {
        let power = self.real_power(power);
        if in_support {
            self.total_favorable = self.total_favorable.saturating_add(power);
        } else {
            self.total_against = self.total_against.saturating_add(power);
        }
    }

    fn unrecord_vote(&mut self, in_support: bool, power: Balance) {
        let power = self.real_power(power);
        if in_support {
            self.total_favorable = self.total_favorable.saturating_sub(power);
        } else {
            self.total_against = self.total_against.saturating_sub(power);
        }
    }
}

impl VotingStrategy for CoinVoting {
    fn record_decision(&mut self, voter: &str, decision: Decision) -> Result<()> {
        let (in_support, power) = match decision {
            Decision::Vote { in_support, power } => (in_support, power),
            other => {
                return Err(GovernanceError::DecisionMismatch(format!(
                    "coin voting expects a vote, got {}",
                    other.kind()
                )))
            }
        };

        // A second decision replaces the first one
        if let Some(previous) = self.votes.get(voter).copied() {
            self.unrecord_vote(previous.in_support, previous.power);
        }
        self.record_vote(in_support, power);
        self.votes
            .insert(voter.to_string(), CastVote { in_support, power });
        Ok(())
    }

    fn is_passing(&self, total_supply: Balance) -> bool {
        let participation = self.total_favorable.saturating_add(self.total_against);
        let enough_participation =
            exceeds_percent_of(participation, self.parameters.min_participation, total_supply);
        let enough_quorum =
            exceeds_percent_of(self.total_favorable, self.parameters.min_quorum, participation);
        enough_participation && enough_quorum
    }

    fn is_expired(&self, created_on: BlockNumber, now: BlockNumber) -> bool {
        now > created_on.saturating_add(self.parameters.ttl)
    }

    fn voter_count(&self) -> usize {
        self.votes.len()
    }

    fn has_voter(&self, voter: &str) -> bool {
        self.votes.contains_key(voter)
    }
}

/// Floor of the square root, Newton's method.
pub fn integer_sqrt(n: Balance) -> Balance {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = x / 2 + 1;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}
