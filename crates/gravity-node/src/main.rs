//! gravityd: operator tool for a gravity module state database.
//!
//! Usage:
//!   gravityd init          --genesis <file>       [--data-dir <dir>]
//!   gravityd exec-proposal <msg.json>             [--data-dir <dir>]
//!   gravityd query attestations --chain-id <id>
//!   gravityd query nonces       --chain-id <id>
//!   gravityd query balance      <bech32> [--denom <denom>]
//!   gravityd query pool
//!   gravityd query supply       <denom>
//!
//! `exec-proposal` runs a passed governance proposal inside one atomic
//! state branch. An invariant violation (corrupt store, broken accounting)
//! terminates the process with exit code 2 after nothing has been written.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use gravity_core::proposal::MsgSubmitProposal;
use gravity_core::types::{AccAddress, ChainId};
use gravity_genesis::{apply_genesis, GenesisState};
use gravity_keeper::{execute_submission, register_proposal_types, Outcome, StoreKeeper};
use gravity_state::{BankKeeper, DistributionKeeper, StateDb};

/// Exit code for invariant violations, distinct from ordinary failures.
const EXIT_CRITICAL: i32 = 2;

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "gravityd",
    version,
    about = "Gravity bridge governance node: genesis import, proposal execution and state queries"
)]
struct Args {
    /// Directory for the persistent state database.
    #[arg(long, global = true, default_value = "~/.gravity/data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a genesis file into a fresh state database.
    Init {
        /// Path to the genesis JSON.
        #[arg(long)]
        genesis: PathBuf,
    },

    /// Execute a passed governance proposal (MsgSubmitProposal JSON).
    ExecProposal {
        /// Path to the message JSON produced by gravity-cli.
        msg: PathBuf,
    },

    /// Read-only state queries. Output is JSON on stdout.
    #[command(subcommand)]
    Query(Query),
}

#[derive(Subcommand, Debug)]
enum Query {
    /// Every stored attestation for a chain, ascending by nonce.
    Attestations {
        #[arg(long)]
        chain_id: String,
    },
    /// Last observed nonce and per-validator last event nonces for a chain.
    Nonces {
        #[arg(long)]
        chain_id: String,
    },
    /// Account balances.
    Balance {
        address: String,
        #[arg(long)]
        denom: Option<String>,
    },
    /// The community pool.
    Pool,
    /// Total supply of a denom.
    Supply { denom: String },
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

    let data_dir = expand_tilde(&args.data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;
    let db = StateDb::open(&data_dir).context("opening state database")?;

    match args.command {
        Command::Init { genesis } => init(&db, &genesis),
        Command::ExecProposal { msg } => exec_proposal(&db, &msg),
        Command::Query(q) => query(&db, q),
    }
}

// ── Commands ─────────────────────────────────────────────────────────────────

fn init(db: &StateDb, path: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading genesis file {}", path.display()))?;
    let genesis: GenesisState = serde_json::from_str(&raw).context("parsing genesis JSON")?;
    apply_genesis(db, &genesis).context("applying genesis")?;
    info!(genesis = %path.display(), "node initialised");
    Ok(())
}

fn exec_proposal(db: &StateDb, path: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading proposal message {}", path.display()))?;
    let msg: MsgSubmitProposal = serde_json::from_str(&raw).context("parsing MsgSubmitProposal JSON")?;
    if db.is_empty() {
        bail!("state database is empty; run `gravityd init` first");
    }

    let keeper = StoreKeeper::default();
    match execute_submission(db, &keeper, &msg) {
        Ok(Outcome::Unhalted(report)) => {
            println!(
                "bridge unhalted: {} attestations deleted, {} validators affected, {} reset",
                report.deleted_attestations, report.affected_validators, report.reset_validators
            );
        }
        Ok(Outcome::Airdropped(report)) => {
            println!("airdrop executed: {} recipients, {} sent", report.recipients, report.total_sent);
        }
        Err(e) if e.is_critical() => {
            error!(critical = true, error = %e, "invariant violation, halting");
            std::process::exit(EXIT_CRITICAL);
        }
        Err(e) => return Err(e).context("executing proposal"),
    }
    db.flush().context("flushing state")?;
    Ok(())
}

fn query(db: &StateDb, q: Query) -> anyhow::Result<()> {
    let keeper = StoreKeeper::default();
    let ctx = db.begin()?;
    let out = match q {
        Query::Attestations { chain_id } => {
            let chain = ChainId::new(chain_id)?;
            let (mapping, _) = keeper.store.get_attestation_mapping(&ctx, &chain)?;
            let all: Vec<_> = mapping.into_values().flatten().collect();
            serde_json::to_value(all)?
        }
        Query::Nonces { chain_id } => {
            let chain = ChainId::new(chain_id)?;
            let last_observed = keeper.store.get_last_observed_event_nonce(&ctx, &chain)?;
            let validators: Vec<_> = keeper
                .store
                .last_event_nonces(&ctx, &chain)?
                .into_iter()
                .map(|(v, n)| serde_json::json!({ "validator": v, "nonce": n }))
                .collect();
            serde_json::json!({ "last_observed_event_nonce": last_observed, "validators": validators })
        }
        Query::Balance { address, denom } => {
            let addr = AccAddress::from_bech32(&address)?;
            match denom {
                Some(d) => serde_json::to_value(keeper.bank.get_balance(&ctx, &addr, &d)?)?,
                None => serde_json::to_value(keeper.bank.get_all_balances(&ctx, &addr)?)?,
            }
        }
        Query::Pool => serde_json::to_value(keeper.distribution.get_fee_pool(&ctx)?)?,
        Query::Supply { denom } => serde_json::to_value(keeper.bank.get_supply(&ctx, &denom)?)?,
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}
