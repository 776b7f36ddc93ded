use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use dorg_cli::{load_config, NodeState};
use dorg_governance::voting::threshold::percent_of;
use dorg_governance::{
    Balance, ChainFacade, CloseOutcome, Commitment, CurrencyId, Decision, OrganizationDetails,
    Proposal, VotingState, VotingSystem,
};
use owo_colors::OwoColorize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dorg")]
#[command(about = "Decentralized organization governance", version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// State file, overrides the configured one
    #[arg(short, long, value_name = "FILE")]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an organization
    CreateOrg {
        /// Executor account, repeat for several
        #[arg(short, long = "executor")]
        executors: Vec<String>,

        /// CoinVoting, ConvictionVoting or PlcrVoting
        #[arg(short, long)]
        voting: String,

        /// Voting parameter as key=value, repeat for several
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },

    /// Show an organization
    ShowOrg { id: String },

    /// Dispatch a call as an organization, executors only
    ApplyAs {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        org: String,
        /// Hex encoded call
        #[arg(long)]
        call: String,
    },

    /// Open a proposal
    CreateProposal {
        #[arg(long)]
        org: String,
        /// Hex encoded call
        #[arg(long)]
        call: String,
    },

    /// List the proposals of an organization
    ListProposals { org: String },

    /// Vote on a coin or conviction proposal
    Vote {
        proposal: String,
        #[arg(long)]
        voter: String,
        #[arg(long)]
        power: Balance,
        /// Vote against instead of in favor
        #[arg(long)]
        against: bool,
    },

    /// Commit to a hidden vote on a PLCR proposal
    Commit {
        proposal: String,
        #[arg(long)]
        voter: String,
        /// Commitment hash, see the `commitment` command
        #[arg(long)]
        hash: String,
    },

    /// Reveal a committed vote
    Reveal {
        proposal: String,
        #[arg(long)]
        voter: String,
        #[arg(long)]
        power: Balance,
        #[arg(long)]
        salt: u64,
        #[arg(long)]
        against: bool,
    },

    /// Close a proposal at the current height if it passed or expired
    Close { proposal: String },

    /// Drop a proposal without executing it, executors only
    Veto {
        proposal: String,
        #[arg(long)]
        caller: String,
    },

    /// Advance the local chain
    Advance {
        #[arg(default_value = "1")]
        blocks: u64,
    },

    /// Increase the local supply of a currency
    Mint {
        #[arg(long)]
        currency: CurrencyId,
        #[arg(long)]
        amount: Balance,
    },

    /// Print the commitment hash of a vote
    Commitment {
        #[arg(long)]
        power: Balance,
        #[arg(long)]
        salt: u64,
        #[arg(long)]
        against: bool,
    },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

fn decode_call(raw: &str) -> Result<Vec<u8>> {
    hex::decode(raw.trim_start_matches("0x")).with_context(|| format!("invalid call hex '{}'", raw))
}

fn print_organization(id: &str, details: &OrganizationDetails) {
    println!("{}: {}", "Organization".yellow().bold(), id);
    println!("  Executors: {}", details.executors.join(", "));
    match &details.voting {
        VotingSystem::Coin(p) => println!(
            "  Voting:    CoinVoting ttl={} currency={} quorum={}% participation={}% counting={:?}",
            p.ttl, p.voting_currency, p.min_quorum, p.min_participation, p.vote_counting_strategy
        ),
        VotingSystem::Conviction(p) => println!(
            "  Voting:    ConvictionVoting ttl={} currency={} quorum={}% participation={}% \
             decay={}",
            p.ttl, p.voting_currency, p.min_quorum, p.min_participation, p.decay
        ),
        VotingSystem::Plcr(p) => println!(
            "  Voting:    PlcrVoting commit={} reveal={} currency={} quorum={}% \
             participation={}%",
            p.commit_duration,
            p.reveal_duration,
            p.voting_currency,
            p.min_quorum,
            p.min_participation
        ),
    }
}

/// Votes needed to clear the participation threshold against `supply`.
fn participation_needed(percent: u32, supply: Balance) -> String {
    format!("> {} of {}", percent_of(percent, supply), supply)
}

fn print_proposal(proposal: &Proposal, supply: Balance) {
    println!("{}: {}", "Proposal".yellow().bold(), proposal.id);
    println!("  Call:       0x{}", hex::encode(&proposal.call));
    println!("  Created on: {}", proposal.created_on);
    match &proposal.state {
        VotingState::Coin(s) => println!(
            "  Needs:      {}",
            participation_needed(s.parameters.min_participation, supply)
        ),
        VotingState::Conviction(s) => println!(
            "  Needs:      expiry after height {}",
            proposal.created_on.saturating_add(s.parameters.ttl)
        ),
        VotingState::Plcr(s) => println!(
            "  Needs:      {} revealed",
            participation_needed(s.parameters.min_participation, supply)
        ),
    }
    match &proposal.state {
        VotingState::Coin(s) => println!(
            "  Tally:      {} for / {} against ({} voters)",
            s.total_favorable.to_string().green(),
            s.total_against.to_string().red(),
            s.votes.len()
        ),
        VotingState::Conviction(s) => println!(
            "  Stake:      {} for / {} against ({} voters)",
            s.conviction_for.to_string().green(),
            s.conviction_against.to_string().red(),
            s.convictions.len()
        ),
        VotingState::Plcr(s) => println!(
            "  Revealed:   {} for / {} against ({} participants)",
            s.revealed_favorable.to_string().green(),
            s.revealed_against.to_string().red(),
            s.entries.len()
        ),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());
    let state_file = cli.state.unwrap_or(config.node.state_file);

    if let Commands::Commitment {
        power,
        salt,
        against,
    } = cli.command
    {
        println!("{}", Commitment::of_vote(power, !against, salt));
        return Ok(());
    }

    let state = NodeState::load(&state_file)?;
    let mut manager = state.into_manager(config.governance);

    match cli.command {
        Commands::CreateOrg {
            executors,
            voting,
            params,
        } => {
            let params: BTreeMap<String, String> = params.into_iter().collect();
            let id = manager.create_organization_from_tag(executors, &voting, &params)?;
            println!("{} {}", "✓ Created organization".green(), id);
        }
        Commands::ShowOrg { id } => {
            let details = manager.organization(&id)?;
            print_organization(&id, &details);
        }
        Commands::ApplyAs { caller, org, call } => {
            manager.apply_as(&caller, &org, &decode_call(&call)?)?;
            println!("{}", "✓ Call dispatched".green());
        }
        Commands::CreateProposal { org, call } => {
            let id = manager.create_proposal(&org, decode_call(&call)?)?;
            println!("{} {}", "✓ Created proposal".green(), id);
        }
        Commands::ListProposals { org } => {
            let proposals = manager.proposals_of(&org)?;
            if proposals.is_empty() {
                println!("No open proposals");
            }
            for proposal in &proposals {
                let supply = manager
                    .chain()
                    .total_issuance(proposal.state.voting_currency());
                print_proposal(proposal, supply);
            }
        }
        Commands::Vote {
            proposal,
            voter,
            power,
            against,
        } => {
            let decision = Decision::Vote {
                in_support: !against,
                power,
            };
            manager.submit_decision(&proposal, &voter, decision)?;
            println!("{}", "✓ Vote recorded".green());
        }
        Commands::Commit {
            proposal,
            voter,
            hash,
        } => {
            let commitment: Commitment = hash
                .parse()
                .map_err(|e| anyhow!("invalid commitment: {}", e))?;
            manager.submit_decision(&proposal, &voter, Decision::Commit(commitment))?;
            println!("{}", "✓ Commitment recorded".green());
        }
        Commands::Reveal {
            proposal,
            voter,
            power,
            salt,
            against,
        } => {
            let decision = Decision::Reveal {
                power,
                in_support: !against,
                salt,
            };
            manager.submit_decision(&proposal, &voter, decision)?;
            println!("{}", "✓ Vote revealed".green());
        }
        Commands::Close { proposal } => {
            // Save even when dispatch failed: the proposal is gone either way
            let outcome = manager.close(&proposal);
            NodeState::from_manager(manager).save(&state_file)?;
            match outcome? {
                CloseOutcome::Closed(reason) => {
                    println!("{} ({:?})", "✓ Proposal closed".green(), reason)
                }
                CloseOutcome::NotYetClosable => {
                    println!("{}", "Proposal is not closable yet".yellow())
                }
            }
            return Ok(());
        }
        Commands::Veto { proposal, caller } => {
            manager.veto_proposal(&caller, &proposal)?;
            println!("{}", "✓ Proposal vetoed".green());
        }
        Commands::Advance { blocks } => {
            let height = manager.chain_mut().advance(blocks);
            println!("Height: {}", height);
        }
        Commands::Mint { currency, amount } => {
            if currency == 0 {
                return Err(anyhow!("currency 0 is reserved"));
            }
            let supply = manager.chain_mut().mint(currency, amount);
            println!("Supply of currency {}: {}", currency, supply);
        }
        // Printed before the state was loaded
        Commands::Commitment { .. } => return Ok(()),
    }

    NodeState::from_manager(manager).save(&state_file)?;
    Ok(())
}
