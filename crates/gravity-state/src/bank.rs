use gravity_core::coin::{validate_denom, Coin, Int};
use gravity_core::constants::{DISTRIBUTION_MODULE, GOV_MODULE, GRAVITY_MODULE};
use gravity_core::error::GravityError;
use gravity_core::types::AccAddress;
use std::collections::BTreeSet;
use tracing::debug;

use crate::context::Context;
use crate::expected::BankKeeper;
use crate::keys;

/// Account balances and per-denom total supply.
///
/// Module accounts are blocked as transfer recipients, mirroring the ledger
/// rule that only a module's own keeper may credit it.
#[derive(Clone, Debug)]
pub struct BankStore {
    blocked: BTreeSet<AccAddress>,
}

impl Default for BankStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BankStore {
    /// A bank with every known module account blocked.
    pub fn new() -> Self {
        let blocked = [DISTRIBUTION_MODULE, GOV_MODULE, GRAVITY_MODULE]
            .into_iter()
            .map(AccAddress::for_module)
            .collect();
        Self { blocked }
    }

    pub fn is_blocked(&self, addr: &AccAddress) -> bool {
        self.blocked.contains(addr)
    }

    pub fn get_balance(&self, ctx: &Context, addr: &AccAddress, denom: &str) -> Result<Coin, GravityError> {
        let amount = ctx.get_u128(&keys::balance_key(addr, denom))?.unwrap_or(0);
        Ok(Coin::new(denom, amount))
    }

    /// Every non-zero balance held by `addr`, sorted by denom.
    pub fn get_all_balances(&self, ctx: &Context, addr: &AccAddress) -> Result<Vec<Coin>, GravityError> {
        let prefix = keys::balance_prefix(addr);
        let mut out = Vec::new();
        for (key, value) in ctx.iter_prefix(&prefix)? {
            let denom = String::from_utf8(key[prefix.len()..].to_vec())
                .map_err(|e| GravityError::Storage(format!("non-utf8 denom in balance key: {e}")))?;
            let arr: [u8; 16] = value
                .as_slice()
                .try_into()
                .map_err(|_| GravityError::Serialization(format!("corrupt balance for {denom}")))?;
            out.push(Coin::new(denom, Int::from_be_bytes(arr)));
        }
        Ok(out)
    }

    fn set_balance(&self, ctx: &mut Context, addr: &AccAddress, denom: &str, amount: Int) {
        let key = keys::balance_key(addr, denom);
        if amount == 0 {
            ctx.delete(&key);
        } else {
            ctx.set_u128(key, amount);
        }
    }

    /// Create new coins in a module account, increasing total supply.
    pub fn mint_coins(&self, ctx: &mut Context, module: &str, coins: &[Coin]) -> Result<(), GravityError> {
        let addr = AccAddress::for_module(module);
        for coin in coins.iter().filter(|c| c.amount > 0) {
            validate_denom(&coin.denom)?;
            let balance = self.get_balance(ctx, &addr, &coin.denom)?.amount;
            let balance = balance
                .checked_add(coin.amount)
                .ok_or(GravityError::Overflow("module balance"))?;
            let supply = self.get_supply(ctx, &coin.denom)?.amount;
            let supply = supply
                .checked_add(coin.amount)
                .ok_or(GravityError::Overflow("total supply"))?;
            self.set_balance(ctx, &addr, &coin.denom, balance);
            ctx.set_u128(keys::supply_key(&coin.denom), supply);
            debug!(module, coin = %coin, "minted");
        }
        Ok(())
    }

    /// Mint coins straight into a user account. Genesis only.
    pub fn mint_to_account(&self, ctx: &mut Context, addr: &AccAddress, coins: &[Coin]) -> Result<(), GravityError> {
        for coin in coins.iter().filter(|c| c.amount > 0) {
            validate_denom(&coin.denom)?;
            let balance = self
                .get_balance(ctx, addr, &coin.denom)?
                .amount
                .checked_add(coin.amount)
                .ok_or(GravityError::Overflow("account balance"))?;
            let supply = self
                .get_supply(ctx, &coin.denom)?
                .amount
                .checked_add(coin.amount)
                .ok_or(GravityError::Overflow("total supply"))?;
            self.set_balance(ctx, addr, &coin.denom, balance);
            ctx.set_u128(keys::supply_key(&coin.denom), supply);
        }
        Ok(())
    }

    /// Move coins between two accounts. Supply is unchanged.
    pub fn send_coins(
        &self,
        ctx: &mut Context,
        from: &AccAddress,
        to: &AccAddress,
        coins: &[Coin],
        from_label: &str,
    ) -> Result<(), GravityError> {
        for coin in coins.iter().filter(|c| c.amount > 0) {
            let have = self.get_balance(ctx, from, &coin.denom)?.amount;
            let rest = have.checked_sub(coin.amount).ok_or_else(|| GravityError::InsufficientModuleFunds {
                module: from_label.to_string(),
                denom: coin.denom.clone(),
                need: coin.amount,
                have,
            })?;
            self.set_balance(ctx, from, &coin.denom, rest);

            let received = self
                .get_balance(ctx, to, &coin.denom)?
                .amount
                .checked_add(coin.amount)
                .ok_or(GravityError::Overflow("recipient balance"))?;
            self.set_balance(ctx, to, &coin.denom, received);
        }
        Ok(())
    }
}

impl BankKeeper for BankStore {
    fn get_supply(&self, ctx: &Context, denom: &str) -> Result<Coin, GravityError> {
        let amount = ctx.get_u128(&keys::supply_key(denom))?.unwrap_or(0);
        Ok(Coin::new(denom, amount))
    }

    fn send_coins_from_module_to_account(
        &self,
        ctx: &mut Context,
        module: &str,
        recipient: &AccAddress,
        coins: &[Coin],
    ) -> Result<(), GravityError> {
        if self.is_blocked(recipient) {
            return Err(GravityError::BlockedRecipient(recipient.to_string()));
        }
        let from = AccAddress::for_module(module);
        self.send_coins(ctx, &from, recipient, coins, module)
    }
}
