//! Conviction voting
//!
//! Conviction accrues continuously with the time stake is left on a
//! proposal. Computing it needs a time integral over every voter's stake,
//! which this crate does not do: `is_passing` is always `false` and a
//! conviction proposal only ever closes through expiry. This is a known
//! limitation, kept on purpose.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Decision, VotingStrategy};
use crate::error::{GovernanceError, Result};
use crate::{AccountId, Balance, BlockNumber, CurrencyId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvictionParameters {
    pub ttl: BlockNumber,
    pub voting_currency: CurrencyId,
    pub min_quorum: u32,
    pub min_participation: u32,
    /// Half-life decay factor for the conviction curve.
    #[serde(default)]
    pub decay: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvictionVote {
    pub in_support: bool,
    pub power: Balance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvictionVoting {
    pub parameters: ConvictionParameters,
    pub convictions: BTreeMap<AccountId, ConvictionVote>,
    /// Stake currently placed in favor.
    pub conviction_for: Balance,
    /// Stake currently placed against.
    pub conviction_against: Balance,
}

impl ConvictionVoting {
    pub fn new(parameters: ConvictionParameters) -> Self {
        Self {
            parameters,
            convictions: BTreeMap::new(),
            conviction_for: 0,
            conviction_against: 0,
        }
    }

    fn side(&mut self, in_support: bool) -> &mut Balance {
        if in_support {
            &mut self.conviction_for
        } else {
            &mut self.conviction_against
        }
    }
}

impl VotingStrategy for ConvictionVoting {
    fn record_decision(&mut self, voter: &str, decision: Decision) -> Result<()> {
        let vote = match decision {
            Decision::Vote { in_support, power } => ConvictionVote { in_support, power },
            other => {
                return Err(GovernanceError::DecisionMismatch(format!(
                    "conviction voting expects a vote, got {}",
                    other.kind()
                )))
            }
        };

        if let Some(previous) = self.convictions.get(voter).copied() {
            let side = self.side(previous.in_support);
            *side = side.saturating_sub(previous.power);
        }
        let side = self.side(vote.in_support);
        *side = side.saturating_add(vote.power);
        self.convictions.insert(voter.to_string(), vote);
        Ok(())
    }

    fn is_passing(&self, _total_supply: Balance) -> bool {
        false
    }

    fn is_expired(&self, created_on: BlockNumber, now: BlockNumber) -> bool {
        now > created_on.saturating_add(self.parameters.ttl)
    }

    fn voter_count(&self) -> usize {
        self.convictions.len()
    }

    fn has_voter(&self, voter: &str) -> bool {
        self.convictions.contains_key(voter)
    }
}
