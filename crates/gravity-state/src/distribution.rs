use gravity_core::coin::DecCoins;
use gravity_core::error::GravityError;
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::expected::DistributionKeeper;
use crate::keys;

/// Distribution module fee pool. Only the community-pool component is
/// modelled.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePool {
    pub community_pool: DecCoins,
}

/// Holds the fee pool under a single key. The coins backing the community
/// pool live in the distribution module's bank account.
#[derive(Clone, Copy, Debug, Default)]
pub struct DistributionStore;

impl DistributionStore {
    pub fn new() -> Self {
        Self
    }
}

impl DistributionKeeper for DistributionStore {
    fn get_fee_pool(&self, ctx: &Context) -> Result<FeePool, GravityError> {
        Ok(ctx.get_typed(&keys::fee_pool_key())?.unwrap_or_default())
    }

    fn set_fee_pool(&self, ctx: &mut Context, pool: &FeePool) -> Result<(), GravityError> {
        ctx.set_typed(keys::fee_pool_key(), pool)
    }
}
