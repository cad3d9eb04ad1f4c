use gravity_core::error::{ErrorClass, GravityError};
use gravity_core::proposal::{GravityProposal, MsgSubmitProposal, ProposalContent};
use gravity_state::{BankKeeper, Context, DistributionKeeper, StakingKeeper, StateDb};
use tracing::{error, info};

use crate::airdrop::AirdropReport;
use crate::keeper::Keeper;
use crate::registry;
use crate::unhalt::PruneReport;

/// Result of a successfully executed gravity proposal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Unhalted(PruneReport),
    Airdropped(AirdropReport),
}

impl<S: StakingKeeper, B: BankKeeper, D: DistributionKeeper> Keeper<S, B, D> {
    pub fn handle_proposal(&self, ctx: &mut Context, proposal: &GravityProposal) -> Result<Outcome, GravityError> {
        match proposal {
            GravityProposal::UnhaltBridge(p) => self.handle_unhalt_bridge_proposal(ctx, p).map(Outcome::Unhalted),
            GravityProposal::Airdrop(p) => self.handle_airdrop_proposal(ctx, p).map(Outcome::Airdropped),
        }
    }
}

fn log_failure(what: &str, e: &GravityError) {
    match e.class() {
        ErrorClass::Invariant => error!(critical = true, proposal = what, error = %e, "proposal aborted"),
        ErrorClass::Policy | ErrorClass::Storage => error!(proposal = what, error = %e, "proposal rejected"),
        ErrorClass::Input | ErrorClass::Unknown => info!(proposal = what, error = %e, "proposal rejected"),
    }
}

fn run_committed<S, B, D>(
    db: &StateDb,
    keeper: &Keeper<S, B, D>,
    proposal: &GravityProposal,
) -> Result<Outcome, GravityError>
where
    S: StakingKeeper,
    B: BankKeeper,
    D: DistributionKeeper,
{
    let what = proposal.kind().route();
    let ctx = db.begin()?;
    let height = ctx.height() + 1;
    let mut ctx = ctx.with_height(height);
    match keeper.handle_proposal(&mut ctx, proposal) {
        Ok(outcome) => {
            let keys = ctx.commit()?;
            info!(proposal = what, height, keys, "proposal executed");
            Ok(outcome)
        }
        Err(e) => {
            // ctx is dropped here; none of its writes reach the store.
            log_failure(what, &e);
            Err(e)
        }
    }
}

/// Execute passed proposal content against `db`. State changes are committed
/// atomically when the handler succeeds and discarded when it fails. Content
/// this module does not execute is `UnknownProposalType`.
pub fn execute_proposal<S, B, D>(
    db: &StateDb,
    keeper: &Keeper<S, B, D>,
    content: &ProposalContent,
) -> Result<Outcome, GravityError>
where
    S: StakingKeeper,
    B: BankKeeper,
    D: DistributionKeeper,
{
    let proposal = GravityProposal::from_content(content).inspect_err(|e| log_failure(&content.type_url, e))?;
    run_committed(db, keeper, &proposal)
}

/// Validate a submission message against the registry, then execute its
/// content as in `execute_proposal`.
pub fn execute_submission<S, B, D>(
    db: &StateDb,
    keeper: &Keeper<S, B, D>,
    msg: &MsgSubmitProposal,
) -> Result<Outcome, GravityError>
where
    S: StakingKeeper,
    B: BankKeeper,
    D: DistributionKeeper,
{
    let proposal = msg
        .validate_basic(registry::is_registered)
        .inspect_err(|e| log_failure(&msg.content.type_url, e))?;
    run_committed(db, keeper, &proposal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keeper::StoreKeeper;
    use crate::registry::register_proposal_types;
    use crate::testutil::{acc, attestation, eth, fund_pool, pool_of};
    use gravity_core::coin::{Coin, Dec};
    use gravity_core::constants::GOV_MODULE;
    use gravity_core::proposal::{encode_recipients, AirdropProposal, UnhaltBridgeProposal};
    use gravity_core::types::AccAddress;

    fn airdrop_content(recipients: &[AccAddress], amounts: Vec<u64>) -> ProposalContent {
        let bech: Vec<String> = recipients.iter().map(|a| a.to_bech32().unwrap()).collect();
        GravityProposal::Airdrop(AirdropProposal {
            title: "airdrop".into(),
            description: "community airdrop".into(),
            denom: "ugrav".into(),
            recipients: encode_recipients(&bech).unwrap(),
            amounts,
        })
        .to_content()
        .unwrap()
    }

    fn funded_db(keeper: &StoreKeeper) -> StateDb {
        let db = StateDb::open_temporary().unwrap();
        let mut ctx = db.begin().unwrap();
        fund_pool(&mut ctx, keeper, "ugrav", 1000);
        ctx.commit().unwrap();
        db
    }

    #[test]
    fn success_is_committed() {
        let keeper = StoreKeeper::default();
        let db = funded_db(&keeper);
        let outcome = execute_proposal(&db, &keeper, &airdrop_content(&[acc(1)], vec![250])).unwrap();
        assert!(matches!(outcome, Outcome::Airdropped(AirdropReport { recipients: 1, .. })));

        let ctx = db.begin().unwrap();
        assert_eq!(pool_of(&ctx, &keeper, "ugrav"), Dec::from_int(750));
        assert_eq!(keeper.bank.get_balance(&ctx, &acc(1), "ugrav").unwrap().amount, 250);
        assert_eq!(db.height().unwrap(), 1);
    }

    #[test]
    fn failure_commits_nothing() {
        let keeper = StoreKeeper::default();
        let db = funded_db(&keeper);
        let blocked = AccAddress::for_module(GOV_MODULE);
        let err = execute_proposal(&db, &keeper, &airdrop_content(&[acc(1), acc(2), blocked], vec![1, 2, 3]))
            .unwrap_err();
        assert!(matches!(err, GravityError::BlockedRecipient(_)));

        let ctx = db.begin().unwrap();
        assert_eq!(keeper.bank.get_balance(&ctx, &acc(1), "ugrav").unwrap().amount, 0);
        assert_eq!(keeper.bank.get_balance(&ctx, &acc(2), "ugrav").unwrap().amount, 0);
        assert_eq!(pool_of(&ctx, &keeper, "ugrav"), Dec::from_int(1000));
        assert_eq!(db.height().unwrap(), 0);
    }

    #[test]
    fn unknown_content_is_rejected() {
        let keeper = StoreKeeper::default();
        let db = StateDb::open_temporary().unwrap();
        for type_url in ["gravity/IBCMetadata", "cosmos/TextProposal"] {
            let content = ProposalContent { type_url: type_url.into(), value: serde_json::json!({}) };
            let err = execute_proposal(&db, &keeper, &content).unwrap_err();
            assert!(matches!(err, GravityError::UnknownProposalType(ref t) if t == type_url));
        }
    }

    #[test]
    fn unhalt_dispatch_commits_rollback() {
        let keeper = StoreKeeper::default();
        let db = StateDb::open_temporary().unwrap();
        let chain = eth();
        let mut ctx = db.begin().unwrap();
        keeper.store.set_attestation(&mut ctx, &attestation(&chain, 3, 0, &[1])).unwrap();
        keeper.store.set_attestation(&mut ctx, &attestation(&chain, 8, 0, &[1])).unwrap();
        ctx.commit().unwrap();

        let content = GravityProposal::UnhaltBridge(UnhaltBridgeProposal {
            title: "unhalt".into(),
            description: "fork on eth".into(),
            target_nonce: 4,
            chain_id: chain.clone(),
        })
        .to_content()
        .unwrap();
        let outcome = execute_proposal(&db, &keeper, &content).unwrap();
        assert!(matches!(outcome, Outcome::Unhalted(PruneReport { deleted_attestations: 1, .. })));

        let ctx = db.begin().unwrap();
        let (_, nonces) = keeper.store.get_attestation_mapping(&ctx, &chain).unwrap();
        assert_eq!(nonces, vec![3]);
    }

    #[test]
    fn submission_goes_through_registry() {
        register_proposal_types();
        let keeper = StoreKeeper::default();
        let db = funded_db(&keeper);
        let msg = MsgSubmitProposal {
            proposer: "gravity1notanaddress".into(),
            initial_deposit: vec![Coin::new("ugrav", 1)],
            content: airdrop_content(&[acc(3)], vec![5]),
        };
        assert!(execute_submission(&db, &keeper, &msg).is_err());

        let msg = MsgSubmitProposal { proposer: acc(7).to_bech32().unwrap(), ..msg };
        execute_submission(&db, &keeper, &msg).unwrap();
        let ctx = db.begin().unwrap();
        assert_eq!(keeper.bank.get_balance(&ctx, &acc(3), "ugrav").unwrap().amount, 5);
    }
}
