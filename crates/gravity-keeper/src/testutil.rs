use gravity_core::attestation::{Attestation, ClaimHash};
use gravity_core::coin::{Coin, Dec, DecCoin};
use gravity_core::constants::{ADDRESS_LEN, DISTRIBUTION_MODULE};
use gravity_core::types::{AccAddress, ChainId, EventNonce, ValAddress};
use gravity_state::{Context, DistributionKeeper, FeePool};

use crate::keeper::StoreKeeper;

pub fn val(i: u8) -> ValAddress {
    ValAddress::from_bytes([i; ADDRESS_LEN])
}

pub fn valoper(i: u8) -> String {
    val(i).to_bech32().unwrap()
}

pub fn acc(i: u8) -> AccAddress {
    AccAddress::from_bytes([i; ADDRESS_LEN])
}

pub fn eth() -> ChainId {
    ChainId::new("eth").unwrap()
}

/// Attestation at `nonce` voted on by the validators numbered in `voters`.
pub fn attestation(chain: &ChainId, nonce: EventNonce, claim: u8, voters: &[u8]) -> Attestation {
    Attestation {
        chain_id: chain.clone(),
        event_nonce: nonce,
        claim_hash: ClaimHash::of(&[claim, nonce as u8]),
        height: 100 + nonce,
        observed: false,
        votes: voters.iter().map(|v| valoper(*v)).collect(),
    }
}

pub fn bond(ctx: &mut Context, keeper: &StoreKeeper, validators: &[u8]) {
    for (i, v) in validators.iter().enumerate() {
        keeper.staking.set_validator_power(ctx, &val(*v), 10 + i as u64).unwrap();
    }
}

/// Mint `amount` into the distribution module and credit it to the
/// community pool, the way fees accrue on a live chain.
pub fn fund_pool(ctx: &mut Context, keeper: &StoreKeeper, denom: &str, amount: u128) {
    keeper
        .bank
        .mint_coins(ctx, DISTRIBUTION_MODULE, &[Coin::new(denom, amount)])
        .unwrap();
    let mut pool = keeper.distribution.get_fee_pool(ctx).unwrap();
    pool.community_pool = pool
        .community_pool
        .checked_add_coin(&DecCoin::new(denom, Dec::from_int(amount)))
        .unwrap();
    keeper.distribution.set_fee_pool(ctx, &pool).unwrap();
}

pub fn pool_of(ctx: &Context, keeper: &StoreKeeper, denom: &str) -> Dec {
    let FeePool { community_pool } = keeper.distribution.get_fee_pool(ctx).unwrap();
    community_pool.amount_of(denom)
}

