//! Voting systems
//!
//! An organization is bound to one [`VotingSystem`] at creation. Every
//! proposal it opens carries a fresh [`VotingState`] for that system, and the
//! lifecycle controller talks to the state only through [`VotingStrategy`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{GovernanceError, Result};
use crate::{Balance, BlockNumber, CurrencyId};
use dorg_crypto::Commitment;

mod coin;
mod conviction;
mod plcr;
pub mod threshold;

pub use coin::{integer_sqrt, CastVote, CoinParameters, CoinVoting};
pub use conviction::{ConvictionParameters, ConvictionVote, ConvictionVoting};
pub use plcr::{PlcrEntry, PlcrParameters, PlcrVoting};

use threshold::MAX_PERCENT;

/// Tag identifying a voting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VotingSystemId {
    CoinVoting,
    ConvictionVoting,
    PlcrVoting,
}

impl VotingSystemId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CoinVoting => "CoinVoting",
            Self::ConvictionVoting => "ConvictionVoting",
            Self::PlcrVoting => "PlcrVoting",
        }
    }

    /// Parameter keys [`VotingSystem::from_tag`] accepts for this system.
    pub fn parameter_keys(&self) -> &'static [&'static str] {
        match self {
            Self::CoinVoting => &[
                "ttl",
                "voting_currency",
                "min_quorum",
                "min_participation",
                "vote_counting_strategy",
            ],
            Self::ConvictionVoting => &[
                "ttl",
                "voting_currency",
                "min_quorum",
                "min_participation",
                "decay",
            ],
            Self::PlcrVoting => &[
                "commit_duration",
                "reveal_duration",
                "voting_currency",
                "min_quorum",
                "min_participation",
            ],
        }
    }
}

impl fmt::Display for VotingSystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VotingSystemId {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CoinVoting" => Ok(Self::CoinVoting),
            "ConvictionVoting" => Ok(Self::ConvictionVoting),
            "PlcrVoting" => Ok(Self::PlcrVoting),
            other => Err(GovernanceError::InvalidVotingSystem(format!(
                "unknown voting system tag '{}'",
                other
            ))),
        }
    }
}

/// How staked coins translate into counted power.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteCountingStrategy {
    #[default]
    Simple,
    Quadratic,
}

impl FromStr for VoteCountingStrategy {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Simple" | "simple" => Ok(Self::Simple),
            "Quadratic" | "quadratic" => Ok(Self::Quadratic),
            other => Err(GovernanceError::InvalidVotingSystem(format!(
                "unknown vote counting strategy '{}'",
                other
            ))),
        }
    }
}

/// Voting system an organization is bound to, with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VotingSystem {
    Coin(CoinParameters),
    Conviction(ConvictionParameters),
    Plcr(PlcrParameters),
}

impl VotingSystem {
    pub fn id(&self) -> VotingSystemId {
        match self {
            Self::Coin(_) => VotingSystemId::CoinVoting,
            Self::Conviction(_) => VotingSystemId::ConvictionVoting,
            Self::Plcr(_) => VotingSystemId::PlcrVoting,
        }
    }

    /// Currency whose total issuance is the participation base.
    pub fn voting_currency(&self) -> CurrencyId {
        match self {
            Self::Coin(p) => p.voting_currency,
            Self::Conviction(p) => p.voting_currency,
            Self::Plcr(p) => p.voting_currency,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let (currency, quorum, participation) = match self {
            Self::Coin(p) => (p.voting_currency, p.min_quorum, p.min_participation),
            Self::Conviction(p) => (p.voting_currency, p.min_quorum, p.min_participation),
            Self::Plcr(p) => (p.voting_currency, p.min_quorum, p.min_participation),
        };
        if currency == 0 {
            return Err(GovernanceError::InvalidVotingSystem(
                "voting_currency must be non-zero".to_string(),
            ));
        }
        for (name, value) in [("min_quorum", quorum), ("min_participation", participation)] {
            if value > MAX_PERCENT {
                return Err(GovernanceError::InvalidVotingSystem(format!(
                    "{} must be at most {}, got {}",
                    name, MAX_PERCENT, value
                )));
            }
        }
        Ok(())
    }

    /// Build a voting system from a tag and string parameters, as supplied by
    /// a CLI or an RPC caller.
    pub fn from_tag(tag: &str, params: &BTreeMap<String, String>) -> Result<Self> {
        let id: VotingSystemId = tag.parse()?;
        let accepted = id.parameter_keys();
        if let Some(key) = params.keys().find(|k| !accepted.contains(&k.as_str())) {
            return Err(GovernanceError::InvalidVotingSystem(format!(
                "parameter {} does not apply to {}",
                key, id
            )));
        }

        let counting = match params.get("vote_counting_strategy") {
            Some(raw) => raw.parse()?,
            None => VoteCountingStrategy::Simple,
        };

        let system = match id {
            VotingSystemId::CoinVoting => Self::Coin(CoinParameters {
                ttl: required(params, "ttl")?,
                voting_currency: required(params, "voting_currency")?,
                min_quorum: required(params, "min_quorum")?,
                min_participation: required(params, "min_participation")?,
                vote_counting_strategy: counting,
            }),
            VotingSystemId::ConvictionVoting => Self::Conviction(ConvictionParameters {
                ttl: required(params, "ttl")?,
                voting_currency: required(params, "voting_currency")?,
                min_quorum: required(params, "min_quorum")?,
                min_participation: required(params, "min_participation")?,
                decay: optional(params, "decay")?.unwrap_or_default(),
            }),
            VotingSystemId::PlcrVoting => Self::Plcr(PlcrParameters {
                commit_duration: required(params, "commit_duration")?,
                reveal_duration: required(params, "reveal_duration")?,
                voting_currency: required(params, "voting_currency")?,
                min_quorum: required(params, "min_quorum")?,
                min_participation: required(params, "min_participation")?,
            }),
        };
        system.validate()?;
        Ok(system)
    }

    /// Empty tallies for a newly created proposal.
    pub fn initial_state(&self) -> VotingState {
        match self {
            Self::Coin(p) => VotingState::Coin(CoinVoting::new(p.clone())),
            Self::Conviction(p) => VotingState::Conviction(ConvictionVoting::new(p.clone())),
            Self::Plcr(p) => VotingState::Plcr(PlcrVoting::new(p.clone())),
        }
    }
}

fn optional<T: FromStr>(params: &BTreeMap<String, String>, key: &str) -> Result<Option<T>> {
    match params.get(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            GovernanceError::InvalidVotingSystem(format!("invalid value '{}' for {}", raw, key))
        }),
    }
}

fn required<T: FromStr>(params: &BTreeMap<String, String>, key: &str) -> Result<T> {
    optional(params, key)?.ok_or_else(|| {
        GovernanceError::InvalidVotingSystem(format!("missing parameter {}", key))
    })
}

/// A voter's input to a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// Coin and Conviction voting.
    Vote { in_support: bool, power: Balance },
    /// PLCR commit phase: hash of the encoded vote.
    Commit(Commitment),
    /// PLCR reveal phase: the preimage of an earlier commit.
    Reveal {
        power: Balance,
        in_support: bool,
        salt: u64,
    },
}

impl Decision {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Vote { .. } => "vote",
            Self::Commit(_) => "commit",
            Self::Reveal { .. } => "reveal",
        }
    }
}

/// Behaviour shared by every voting strategy.
pub trait VotingStrategy {
    /// Fold a voter's decision into the tallies.
    fn record_decision(&mut self, voter: &str, decision: Decision) -> Result<()>;

    /// Whether the proposal would pass against `total_supply` right now.
    fn is_passing(&self, total_supply: Balance) -> bool;

    /// Whether the voting window has ended at height `now`.
    fn is_expired(&self, created_on: BlockNumber, now: BlockNumber) -> bool;

    fn voter_count(&self) -> usize;

    fn has_voter(&self, voter: &str) -> bool;

    /// Reject `decision` when it arrives at a height its phase does not
    /// cover. Strategies without phases accept decisions at any height.
    fn check_phase(
        &self,
        _decision: &Decision,
        _created_on: BlockNumber,
        _now: BlockNumber,
    ) -> Result<()> {
        Ok(())
    }
}

/// Per-proposal tallies, one variant per voting system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VotingState {
    Coin(CoinVoting),
    Conviction(ConvictionVoting),
    Plcr(PlcrVoting),
}

impl VotingState {
    /// Which strategy these tallies belong to.
    pub fn system_id(&self) -> VotingSystemId {
        match self {
            Self::Coin(_) => VotingSystemId::CoinVoting,
            Self::Conviction(_) => VotingSystemId::ConvictionVoting,
            Self::Plcr(_) => VotingSystemId::PlcrVoting,
        }
    }

    pub fn voting_currency(&self) -> CurrencyId {
        match self {
            Self::Coin(s) => s.parameters.voting_currency,
            Self::Conviction(s) => s.parameters.voting_currency,
            Self::Plcr(s) => s.parameters.voting_currency,
        }
    }

    /// Resolve the strategy for a proposal tagged `id`. Fails when the tag
    /// and the stored tallies disagree.
    pub fn route(&self, id: VotingSystemId) -> Option<&dyn VotingStrategy> {
        match (id, self) {
            (VotingSystemId::CoinVoting, Self::Coin(s)) => Some(s),
            (VotingSystemId::ConvictionVoting, Self::Conviction(s)) => Some(s),
            (VotingSystemId::PlcrVoting, Self::Plcr(s)) => Some(s),
            _ => None,
        }
    }

    pub fn route_mut(&mut self, id: VotingSystemId) -> Option<&mut dyn VotingStrategy> {
        match (id, self) {
            (VotingSystemId::CoinVoting, Self::Coin(s)) => Some(s),
            (VotingSystemId::ConvictionVoting, Self::Conviction(s)) => Some(s),
            (VotingSystemId::PlcrVoting, Self::Plcr(s)) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn coin_params() -> BTreeMap<String, String> {
        params(&[
            ("ttl", "10"),
            ("voting_currency", "1"),
            ("min_quorum", "50"),
            ("min_participation", "33"),
        ])
    }

    #[test]
    fn test_from_tag_coin() {
        let system = VotingSystem::from_tag("CoinVoting", &coin_params()).unwrap();
        assert_eq!(system.id(), VotingSystemId::CoinVoting);
        assert_eq!(system.voting_currency(), 1);
        match system {
            VotingSystem::Coin(p) => {
                assert_eq!(p.ttl, 10);
                assert_eq!(p.vote_counting_strategy, VoteCountingStrategy::Simple);
            }
            other => panic!("unexpected system {:?}", other),
        }
    }

    #[test]
    fn test_from_tag_plcr_uses_phase_durations() {
        let p = params(&[
            ("commit_duration", "5"),
            ("reveal_duration", "7"),
            ("voting_currency", "2"),
            ("min_quorum", "60"),
            ("min_participation", "10"),
        ]);
        let system = VotingSystem::from_tag("PlcrVoting", &p).unwrap();
        assert_eq!(system.id(), VotingSystemId::PlcrVoting);
        assert!(matches!(system.initial_state(), VotingState::Plcr(_)));
    }

    #[test]
    fn test_from_tag_rejects_bad_input() {
        let err = VotingSystem::from_tag("MadeUpVoting", &coin_params()).unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidVotingSystem(_)));

        let mut missing = coin_params();
        missing.remove("ttl");
        assert!(VotingSystem::from_tag("CoinVoting", &missing).is_err());

        let mut bad_number = coin_params();
        bad_number.insert("min_quorum".into(), "lots".into());
        assert!(VotingSystem::from_tag("CoinVoting", &bad_number).is_err());

        let mut over = coin_params();
        over.insert("min_participation".into(), "101".into());
        assert!(VotingSystem::from_tag("CoinVoting", &over).is_err());

        let mut zero_currency = coin_params();
        zero_currency.insert("voting_currency".into(), "0".into());
        assert!(VotingSystem::from_tag("CoinVoting", &zero_currency).is_err());
    }

    #[test]
    fn test_from_tag_rejects_foreign_parameters() {
        let mut coin_with_decay = coin_params();
        coin_with_decay.insert("decay".into(), "3".into());
        let err = VotingSystem::from_tag("CoinVoting", &coin_with_decay).unwrap_err();
        assert_eq!(
            err,
            GovernanceError::InvalidVotingSystem(
                "parameter decay does not apply to CoinVoting".to_string()
            )
        );

        let mut conviction_quadratic = coin_params();
        conviction_quadratic.insert("vote_counting_strategy".into(), "Quadratic".into());
        assert!(VotingSystem::from_tag("ConvictionVoting", &conviction_quadratic).is_err());

        let mut plcr_with_ttl = params(&[
            ("commit_duration", "5"),
            ("reveal_duration", "5"),
            ("voting_currency", "1"),
            ("min_quorum", "50"),
            ("min_participation", "33"),
        ]);
        assert!(VotingSystem::from_tag("PlcrVoting", &plcr_with_ttl).is_ok());
        plcr_with_ttl.insert("ttl".into(), "10".into());
        assert!(VotingSystem::from_tag("PlcrVoting", &plcr_with_ttl).is_err());
    }

    #[test]
    fn test_from_tag_quadratic() {
        let mut p = coin_params();
        p.insert("vote_counting_strategy".into(), "Quadratic".into());
        match VotingSystem::from_tag("CoinVoting", &p).unwrap() {
            VotingSystem::Coin(c) => {
                assert_eq!(c.vote_counting_strategy, VoteCountingStrategy::Quadratic)
            }
            other => panic!("unexpected system {:?}", other),
        }
    }

    #[test]
    fn test_route_requires_matching_tag() {
        let system = VotingSystem::from_tag("CoinVoting", &coin_params()).unwrap();
        let mut state = system.initial_state();
        assert!(state.route(VotingSystemId::CoinVoting).is_some());
        assert!(state.route(VotingSystemId::PlcrVoting).is_none());
        assert!(state.route_mut(VotingSystemId::ConvictionVoting).is_none());
    }

    #[test]
    fn test_system_id_display_round_trip() {
        for id in [
            VotingSystemId::CoinVoting,
            VotingSystemId::ConvictionVoting,
            VotingSystemId::PlcrVoting,
        ] {
            assert_eq!(id.to_string().parse::<VotingSystemId>().unwrap(), id);
        }
    }
}
