use gravity_core::coin::{validate_denom, Coin, Dec, DecCoin, DecCoins, Int};
use gravity_core::constants::{ADDRESS_LEN, DISTRIBUTION_MODULE};
use gravity_core::error::GravityError;
use gravity_core::proposal::{decode_recipients, AirdropProposal};
use gravity_state::{BankKeeper, Context, DistributionKeeper};
use tracing::{error, info};

use crate::keeper::Keeper;

/// What a successful airdrop paid out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AirdropReport {
    pub recipients: usize,
    pub total_sent: Dec,
}

impl<S, B: BankKeeper, D: DistributionKeeper> Keeper<S, B, D> {
    /// Pay every recipient its amount out of the community pool.
    ///
    /// Transfers stop at the first failure. Nothing is rolled back here; the
    /// caller discards the context. After the transfers the total paid must
    /// equal the total requested and the denom's supply must be unchanged,
    /// otherwise a critical error is returned.
    pub fn handle_airdrop_proposal(
        &self,
        ctx: &mut Context,
        proposal: &AirdropProposal,
    ) -> Result<AirdropReport, GravityError> {
        let denom = proposal.denom.as_str();
        let starting_supply = self.bank.get_supply(ctx, denom)?;

        if let Err(e) = validate_denom(denom) {
            info!(denom, "airdrop failed to execute: invalid denom");
            return Err(e);
        }

        // ── Pool balance covers the total ────────────────────────────────────
        let available = self.distribution.get_fee_pool(ctx)?.community_pool.amount_of(denom);

        let total: Int = proposal
            .amounts
            .iter()
            .try_fold(0u128, |acc, a| acc.checked_add(Int::from(*a)))
            .ok_or_else(|| {
                error!(critical = true, denom, "airdrop total overflowed");
                GravityError::Overflow("airdrop total")
            })?;
        let total_required = DecCoin::new(denom, Dec::from_int(total));
        if total_required.amount > available {
            error!(
                denom,
                required = %total_required.amount,
                available = %available,
                "airdrop failed to execute: insufficient tokens in the community pool"
            );
            return Err(GravityError::InsufficientCommunityPool {
                denom: denom.to_string(),
                need: total_required.amount.to_string(),
                available: available.to_string(),
            });
        }

        // ── Recipient buffer shape ───────────────────────────────────────────
        let invalid_recipients = || GravityError::InvalidRecipients {
            len: proposal.recipients.len(),
            amounts: proposal.amounts.len(),
            width: ADDRESS_LEN,
        };
        let num_recipients = proposal.recipients.len() / ADDRESS_LEN;
        if proposal.recipients.len() % ADDRESS_LEN != 0 || num_recipients != proposal.amounts.len() {
            info!(
                recipients_len = proposal.recipients.len(),
                amounts = proposal.amounts.len(),
                "airdrop failed to execute: invalid recipients"
            );
            return Err(invalid_recipients());
        }
        let recipients = decode_recipients(&proposal.recipients)?;
        if recipients.len() != proposal.amounts.len() {
            info!(
                parsed = recipients.len(),
                amounts = proposal.amounts.len(),
                "airdrop failed to execute: recipient count mismatch"
            );
            return Err(invalid_recipients());
        }

        // ── Transfers, fail fast ─────────────────────────────────────────────
        let mut total_sent = Dec::zero();
        for (recipient, amount) in recipients.iter().zip(&proposal.amounts) {
            let coins = [Coin::new(denom, Int::from(*amount))];
            if let Err(e) = self
                .bank
                .send_coins_from_module_to_account(ctx, DISTRIBUTION_MODULE, recipient, &coins)
            {
                info!(recipient = %recipient, error = %e, "invalid address in airdrop, aborting");
                return Err(e);
            }
            total_sent = total_sent
                .checked_add(Dec::from_int(Int::from(*amount)))
                .ok_or(GravityError::Overflow("airdrop total sent"))?;
        }

        // ── Post-conditions ──────────────────────────────────────────────────
        if total_sent != total_required.amount {
            error!(
                critical = true,
                required = %total_required.amount,
                sent = %total_sent,
                "airdrop sent amount does not match the required amount"
            );
            return Err(GravityError::AmountSentMismatch {
                required: total_required.amount.to_string(),
                sent: total_sent.to_string(),
            });
        }

        // Debit the pool as it stands after the transfers.
        let mut fee_pool = self.distribution.get_fee_pool(ctx)?;
        let debit = DecCoins::new(vec![total_required.clone()])?;
        let (remaining, negative) = fee_pool.community_pool.safe_sub(&debit);
        if negative {
            error!(critical = true, debit = %debit, "community pool underflow after airdrop");
            return Err(GravityError::CommunityPoolUnderflow(debit.to_string()));
        }
        fee_pool.community_pool = remaining;
        self.distribution.set_fee_pool(ctx, &fee_pool)?;

        let ending_supply = self.bank.get_supply(ctx, denom)?;
        if starting_supply.amount != ending_supply.amount {
            error!(
                critical = true,
                denom,
                before = %starting_supply,
                after = %ending_supply,
                "total chain supply has changed during airdrop"
            );
            return Err(GravityError::SupplyChanged {
                denom: denom.to_string(),
                before: starting_supply.amount,
                after: ending_supply.amount,
            });
        }

        info!(denom, recipients = recipients.len(), total = %total_sent, "airdrop executed");
        Ok(AirdropReport {
            recipients: recipients.len(),
            total_sent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keeper::StoreKeeper;
    use crate::testutil::{acc, fund_pool, pool_of};
    use gravity_core::constants::GOV_MODULE;
    use gravity_core::error::ErrorClass;
    use gravity_core::types::AccAddress;
    use gravity_state::{BankStore, DistributionStore, FeePool, StakingStore, StateDb};
    use proptest::prelude::*;
    use std::cell::Cell;

    fn proposal(recipients: &[AccAddress], amounts: Vec<u64>) -> AirdropProposal {
        AirdropProposal {
            title: "airdrop".into(),
            description: "community airdrop".into(),
            denom: "ugrav".into(),
            recipients: recipients.iter().flat_map(|a| a.as_bytes().to_vec()).collect(),
            amounts,
        }
    }

    fn balance(ctx: &Context, keeper: &StoreKeeper, addr: &AccAddress) -> Int {
        keeper.bank.get_balance(ctx, addr, "ugrav").unwrap().amount
    }

    #[test]
    fn pays_recipients_and_debits_pool() {
        let db = StateDb::open_temporary().unwrap();
        let keeper = StoreKeeper::default();
        let mut ctx = db.begin().unwrap();
        fund_pool(&mut ctx, &keeper, "ugrav", 1000);
        let (x, y) = (acc(1), acc(2));

        let report = keeper
            .handle_airdrop_proposal(&mut ctx, &proposal(&[x, y], vec![100, 200]))
            .unwrap();
        assert_eq!(report, AirdropReport { recipients: 2, total_sent: Dec::from_int(300) });
        assert_eq!(pool_of(&ctx, &keeper, "ugrav"), Dec::from_int(700));
        assert_eq!(balance(&ctx, &keeper, &x), 100);
        assert_eq!(balance(&ctx, &keeper, &y), 200);
        assert_eq!(keeper.bank.get_supply(&ctx, "ugrav").unwrap().amount, 1000);
    }

    #[test]
    fn overdrawn_pool_is_rejected_before_any_transfer() {
        let db = StateDb::open_temporary().unwrap();
        let keeper = StoreKeeper::default();
        let mut ctx = db.begin().unwrap();
        fund_pool(&mut ctx, &keeper, "ugrav", 1000);
        ctx.commit().unwrap();

        let mut ctx = db.begin().unwrap();
        let err = keeper
            .handle_airdrop_proposal(&mut ctx, &proposal(&[acc(1), acc(2)], vec![700, 800]))
            .unwrap_err();
        assert!(matches!(err, GravityError::InsufficientCommunityPool { .. }));
        assert_eq!(err.class(), ErrorClass::Policy);
        assert_eq!(ctx.pending_writes(), 0);
        assert_eq!(pool_of(&ctx, &keeper, "ugrav"), Dec::from_int(1000));
        assert_eq!(balance(&ctx, &keeper, &acc(1)), 0);
    }

    #[test]
    fn malformed_payloads_are_input_errors() {
        let db = StateDb::open_temporary().unwrap();
        let keeper = StoreKeeper::default();
        let mut ctx = db.begin().unwrap();
        fund_pool(&mut ctx, &keeper, "ugrav", 1000);

        let mut bad_denom = proposal(&[acc(1)], vec![1]);
        bad_denom.denom = "u".into();
        let mut short_buffer = proposal(&[acc(1), acc(2)], vec![1, 2]);
        short_buffer.recipients.pop();
        let extra_amount = proposal(&[acc(1)], vec![1, 2]);

        for p in [bad_denom, short_buffer, extra_amount] {
            let err = keeper.handle_airdrop_proposal(&mut ctx, &p).unwrap_err();
            assert_eq!(err.class(), ErrorClass::Input, "{err}");
        }
        assert_eq!(pool_of(&ctx, &keeper, "ugrav"), Dec::from_int(1000));
    }

    #[test]
    fn failed_transfer_discards_earlier_payments() {
        let db = StateDb::open_temporary().unwrap();
        let keeper = StoreKeeper::default();
        let mut ctx = db.begin().unwrap();
        fund_pool(&mut ctx, &keeper, "ugrav", 1000);
        ctx.commit().unwrap();

        // The gov module account cannot receive; it sits between two valid
        // recipients.
        let blocked = AccAddress::for_module(GOV_MODULE);
        {
            let mut ctx = db.begin().unwrap();
            let err = keeper
                .handle_airdrop_proposal(&mut ctx, &proposal(&[acc(1), blocked, acc(2)], vec![10, 20, 30]))
                .unwrap_err();
            assert!(matches!(err, GravityError::BlockedRecipient(_)));
            // The first payment landed in the branch before the failure.
            assert_eq!(balance(&ctx, &keeper, &acc(1)), 10);
        }

        let ctx = db.begin().unwrap();
        assert_eq!(balance(&ctx, &keeper, &acc(1)), 0);
        assert_eq!(balance(&ctx, &keeper, &acc(2)), 0);
        assert_eq!(pool_of(&ctx, &keeper, "ugrav"), Dec::from_int(1000));
    }

    #[test]
    fn empty_airdrop_is_a_no_op() {
        let db = StateDb::open_temporary().unwrap();
        let keeper = StoreKeeper::default();
        let mut ctx = db.begin().unwrap();
        fund_pool(&mut ctx, &keeper, "ugrav", 5);
        let report = keeper.handle_airdrop_proposal(&mut ctx, &proposal(&[], vec![])).unwrap();
        assert_eq!(report.recipients, 0);
        assert_eq!(pool_of(&ctx, &keeper, "ugrav"), Dec::from_int(5));
    }

    /// A bank that mints a unit on every transfer.
    struct InflatingBank(BankStore);

    impl BankKeeper for InflatingBank {
        fn get_supply(&self, ctx: &Context, denom: &str) -> Result<Coin, GravityError> {
            self.0.get_supply(ctx, denom)
        }

        fn send_coins_from_module_to_account(
            &self,
            ctx: &mut Context,
            module: &str,
            recipient: &AccAddress,
            coins: &[Coin],
        ) -> Result<(), GravityError> {
            self.0.send_coins_from_module_to_account(ctx, module, recipient, coins)?;
            let bonus: Vec<Coin> = coins.iter().map(|c| Coin::new(c.denom.clone(), 1)).collect();
            self.0.mint_to_account(ctx, recipient, &bonus)
        }
    }

    #[test]
    fn supply_change_is_critical() {
        let db = StateDb::open_temporary().unwrap();
        let mut ctx = db.begin().unwrap();
        fund_pool(&mut ctx, &StoreKeeper::default(), "ugrav", 1000);

        let keeper = Keeper::new(StakingStore::new(), InflatingBank(BankStore::new()), DistributionStore::new());
        let err = keeper
            .handle_airdrop_proposal(&mut ctx, &proposal(&[acc(1)], vec![100]))
            .unwrap_err();
        assert!(matches!(err, GravityError::SupplyChanged { before: 1000, after: 1001, .. }));
        assert!(err.is_critical());
    }

    /// A distribution store whose pool loses most of its balance once the
    /// first read has happened.
    struct ShrinkingPool {
        inner: DistributionStore,
        reads: Cell<usize>,
    }

    impl DistributionKeeper for ShrinkingPool {
        fn get_fee_pool(&self, ctx: &Context) -> Result<FeePool, GravityError> {
            let reads = self.reads.get();
            self.reads.set(reads + 1);
            let pool = self.inner.get_fee_pool(ctx)?;
            if reads == 0 {
                return Ok(pool);
            }
            let shrunk = DecCoins::new(vec![DecCoin::new("ugrav", Dec::from_int(50))])?;
            Ok(FeePool { community_pool: shrunk })
        }

        fn set_fee_pool(&self, ctx: &mut Context, pool: &FeePool) -> Result<(), GravityError> {
            self.inner.set_fee_pool(ctx, pool)
        }
    }

    #[test]
    fn pool_underflow_after_transfers_is_critical() {
        let db = StateDb::open_temporary().unwrap();
        let mut ctx = db.begin().unwrap();
        fund_pool(&mut ctx, &StoreKeeper::default(), "ugrav", 1000);

        let keeper = Keeper::new(
            StakingStore::new(),
            BankStore::new(),
            ShrinkingPool { inner: DistributionStore::new(), reads: Cell::new(0) },
        );
        let err = keeper
            .handle_airdrop_proposal(&mut ctx, &proposal(&[acc(1), acc(2)], vec![100, 200]))
            .unwrap_err();
        assert!(matches!(err, GravityError::CommunityPoolUnderflow(_)));
        assert!(err.is_critical());
        // The stored pool was never written back.
        assert_eq!(pool_of(&ctx, &StoreKeeper::default(), "ugrav"), Dec::from_int(1000));
    }

    proptest! {
        #[test]
        fn airdrop_conserves_supply(amounts in proptest::collection::vec(0u64..1_000_000, 0..12)) {
            let db = StateDb::open_temporary().unwrap();
            let keeper = StoreKeeper::default();
            let mut ctx = db.begin().unwrap();
            fund_pool(&mut ctx, &keeper, "ugrav", 20_000_000);
            let recipients: Vec<AccAddress> = (0..amounts.len()).map(|i| acc(i as u8 + 1)).collect();
            let total: u128 = amounts.iter().map(|a| *a as u128).sum();

            keeper.handle_airdrop_proposal(&mut ctx, &proposal(&recipients, amounts.clone())).unwrap();

            prop_assert_eq!(keeper.bank.get_supply(&ctx, "ugrav").unwrap().amount, 20_000_000);
            prop_assert_eq!(pool_of(&ctx, &keeper, "ugrav"), Dec::from_int(20_000_000 - total));
            for (r, a) in recipients.iter().zip(&amounts) {
                prop_assert_eq!(balance(&ctx, &keeper, r), *a as u128);
            }
        }
    }
}
