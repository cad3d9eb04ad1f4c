//! gravity-cli
//!
//! Authoring tool for gravity governance proposals. Reads a proposal JSON
//! file, packs it into a `MsgSubmitProposal` and writes the message JSON for
//! signing and broadcast by the operator's usual tooling.
//!
//! Usage:
//!   gravity-cli gov-airdrop       <proposal.json> <initial-deposit> --from <bech32> [--out <file>]
//!   gravity-cli gov-unhalt-bridge <proposal.json> <initial-deposit> --from <bech32> [--out <file>]
//!
//! The initial deposit is a single coin, e.g. `1000000ugrav`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;

use gravity_core::coin::{parse_coins_normalized, Coin};
use gravity_core::proposal::{
    AirdropProposalPlain, GravityProposal, MsgSubmitProposal, UnhaltBridgeProposal,
};
use gravity_keeper::{is_registered, register_proposal_types};

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "gravity-cli",
    version,
    about = "Build gravity governance proposal messages"
)]
struct Args {
    /// Proposer account (bech32).
    #[arg(long, global = true)]
    from: Option<String>,

    /// Write the message here instead of stdout.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Creates a governance proposal for an airdrop from the community pool.
    GovAirdrop {
        /// Path to the airdrop proposal JSON.
        path: PathBuf,
        /// Initial deposit, exactly one coin.
        initial_deposit: String,
    },

    /// Creates a governance proposal to unhalt the bridge after an oracle
    /// dispute by rolling oracle history back to a target nonce.
    GovUnhaltBridge {
        /// Path to the unhalt proposal JSON.
        path: PathBuf,
        /// Initial deposit, exactly one coin.
        initial_deposit: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gravity=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    register_proposal_types();

    let from = args.from.context("--from <bech32 account> is required")?;
    let msg = match &args.command {
        Command::GovAirdrop { path, initial_deposit } => {
            let deposit = parse_deposit(initial_deposit)?;
            let proposal = read_airdrop(path)?;
            build_msg(&from, deposit, proposal)?
        }
        Command::GovUnhaltBridge { path, initial_deposit } => {
            let deposit = parse_deposit(initial_deposit)?;
            let proposal = read_unhalt(path)?;
            build_msg(&from, deposit, proposal)?
        }
    };

    let json = serde_json::to_string_pretty(&msg)?;
    match &args.out {
        Some(out) => {
            std::fs::write(out, json).with_context(|| format!("writing {}", out.display()))?;
            info!(out = %out.display(), proposal = %msg.content.type_url, "proposal message written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

// ── Message building ──────────────────────────────────────────────────────────

fn parse_deposit(raw: &str) -> anyhow::Result<Coin> {
    let mut coins = parse_coins_normalized(raw).context("bad initial deposit amount")?;
    if coins.len() != 1 {
        bail!("unexpected coin amounts, expecting just 1 coin amount for initialDeposit");
    }
    Ok(coins.remove(0))
}

fn read_proposal_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read proposal json file {}", path.display()))
}

fn read_airdrop(path: &Path) -> anyhow::Result<GravityProposal> {
    let plain: AirdropProposalPlain =
        serde_json::from_str(&read_proposal_file(path)?).context("proposal json file is not valid json")?;
    let proposal = plain.into_proposal().context("airdrop recipient address not valid")?;
    Ok(GravityProposal::Airdrop(proposal))
}

fn read_unhalt(path: &Path) -> anyhow::Result<GravityProposal> {
    let proposal: UnhaltBridgeProposal =
        serde_json::from_str(&read_proposal_file(path)?).context("proposal json file is not valid json")?;
    Ok(GravityProposal::UnhaltBridge(proposal))
}

fn build_msg(from: &str, deposit: Coin, proposal: GravityProposal) -> anyhow::Result<MsgSubmitProposal> {
    let msg = MsgSubmitProposal {
        proposer: from.to_string(),
        initial_deposit: vec![deposit],
        content: proposal.to_content()?,
    };
    msg.validate_basic(is_registered).context("proposal failed validation")?;
    Ok(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gravity_core::constants::ADDRESS_LEN;
    use gravity_core::types::{AccAddress, ChainId};

    fn addr(i: u8) -> String {
        AccAddress::from_bytes([i; ADDRESS_LEN]).to_bech32().unwrap()
    }

    #[test]
    fn deposit_must_be_one_coin() {
        assert_eq!(parse_deposit("1000ugrav").unwrap(), Coin::new("ugrav", 1000));
        assert!(parse_deposit("1000ugrav,5stake").is_err());
        assert!(parse_deposit("0ugrav").is_err());
        assert!(parse_deposit("lots").is_err());
    }

    #[test]
    fn unhalt_message_validates() {
        register_proposal_types();
        let proposal = GravityProposal::UnhaltBridge(UnhaltBridgeProposal {
            title: "unhalt".into(),
            description: "eth fork".into(),
            target_nonce: 12,
            chain_id: ChainId::new("1").unwrap(),
        });
        let msg = build_msg(&addr(1), Coin::new("ugrav", 1), proposal).unwrap();
        assert_eq!(msg.content.type_url, "gravity/UnhaltBridge");
        assert_eq!(msg.content.value["target_nonce"], 12);
    }

    #[test]
    fn invalid_proposer_rejected() {
        register_proposal_types();
        let proposal = GravityProposal::UnhaltBridge(UnhaltBridgeProposal {
            title: "unhalt".into(),
            description: "eth fork".into(),
            target_nonce: 12,
            chain_id: ChainId::new("eth").unwrap(),
        });
        assert!(build_msg("not-an-address", Coin::new("ugrav", 1), proposal).is_err());
    }
}
