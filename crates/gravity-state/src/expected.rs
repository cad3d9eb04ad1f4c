//! Contracts the gravity keeper needs from the staking, bank and
//! distribution modules. The stores in this crate implement them; tests and
//! alternative hosts can supply their own.

use gravity_core::coin::Coin;
use gravity_core::error::GravityError;
use gravity_core::types::{AccAddress, ValAddress};

use crate::context::Context;
use crate::distribution::FeePool;

pub trait StakingKeeper {
    /// Bonded validators, highest voting power first.
    fn get_bonded_validators_by_power(&self, ctx: &Context) -> Result<Vec<ValAddress>, GravityError>;
}

pub trait BankKeeper {
    /// Total supply of `denom` across every account.
    fn get_supply(&self, ctx: &Context, denom: &str) -> Result<Coin, GravityError>;

    /// Move `coins` from a module account to a user account.
    fn send_coins_from_module_to_account(
        &self,
        ctx: &mut Context,
        module: &str,
        recipient: &AccAddress,
        coins: &[Coin],
    ) -> Result<(), GravityError>;
}

pub trait DistributionKeeper {
    fn get_fee_pool(&self, ctx: &Context) -> Result<FeePool, GravityError>;

    fn set_fee_pool(&self, ctx: &mut Context, pool: &FeePool) -> Result<(), GravityError>;
}
