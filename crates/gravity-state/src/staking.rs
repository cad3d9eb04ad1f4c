use gravity_core::error::GravityError;
use gravity_core::types::ValAddress;

use crate::context::Context;
use crate::expected::StakingKeeper;
use crate::keys;

/// Minimal validator registry: a voting power per validator and a
/// power-ordered index. Any validator with non-zero power is bonded.
#[derive(Clone, Copy, Debug, Default)]
pub struct StakingStore;

impl StakingStore {
    pub fn new() -> Self {
        Self
    }

    pub fn get_validator_power(&self, ctx: &Context, validator: &ValAddress) -> Result<u64, GravityError> {
        Ok(ctx.get_u64(&keys::validator_power_key(validator))?.unwrap_or(0))
    }

    /// Set `validator`'s power, keeping the index consistent. Power 0 unbonds.
    pub fn set_validator_power(&self, ctx: &mut Context, validator: &ValAddress, power: u64) -> Result<(), GravityError> {
        let old = self.get_validator_power(ctx, validator)?;
        if old > 0 {
            ctx.delete(&keys::validator_by_power_key(old, validator));
        }
        if power == 0 {
            ctx.delete(&keys::validator_power_key(validator));
        } else {
            ctx.set_u64(keys::validator_power_key(validator), power);
            ctx.set(keys::validator_by_power_key(power, validator), Vec::new());
        }
        Ok(())
    }
}

impl StakingKeeper for StakingStore {
    fn get_bonded_validators_by_power(&self, ctx: &Context) -> Result<Vec<ValAddress>, GravityError> {
        ctx.iter_prefix(&[keys::VALIDATOR_BY_POWER])?
            .into_iter()
            .map(|(key, _)| {
                keys::validator_from_power_key(&key).ok_or_else(|| {
                    GravityError::Storage(format!("malformed power index key {}", hex::encode(&key)))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StateDb;
    use gravity_core::constants::ADDRESS_LEN;

    #[test]
    fn bonded_set_ordered_by_power() {
        let db = StateDb::open_temporary().unwrap();
        let staking = StakingStore::new();
        let a = ValAddress::from_bytes([1u8; ADDRESS_LEN]);
        let b = ValAddress::from_bytes([2u8; ADDRESS_LEN]);
        let c = ValAddress::from_bytes([3u8; ADDRESS_LEN]);
        let mut ctx = db.begin().unwrap();

        staking.set_validator_power(&mut ctx, &a, 10).unwrap();
        staking.set_validator_power(&mut ctx, &b, 50).unwrap();
        staking.set_validator_power(&mut ctx, &c, 30).unwrap();
        assert_eq!(staking.get_bonded_validators_by_power(&ctx).unwrap(), vec![b, c, a]);

        // Re-weighting moves the validator; zero power unbonds it.
        staking.set_validator_power(&mut ctx, &a, 100).unwrap();
        staking.set_validator_power(&mut ctx, &b, 0).unwrap();
        assert_eq!(staking.get_bonded_validators_by_power(&ctx).unwrap(), vec![a, c]);
    }
}
