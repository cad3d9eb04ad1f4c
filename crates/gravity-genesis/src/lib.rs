//! gravity-genesis
//!
//! Imports a `GenesisState` into an empty `StateDb` in one atomic commit:
//!
//! 1. Bonded validators and their voting power
//! 2. Per-chain oracle state: last observed nonce, per-validator nonces and
//!    stored attestations
//! 3. Account balances
//! 4. The community pool, minted into the distribution module account
//!
//! Genesis writes directly through the stores; no proposal handler runs.

pub mod state;

pub use state::{ChainGenesis, GenesisBalance, GenesisState, GenesisValidator, ValidatorNonce};

use gravity_core::coin::{DecCoin, DecCoins};
use gravity_core::constants::DISTRIBUTION_MODULE;
use gravity_core::error::GravityError;
use gravity_state::{
    BankKeeper, BankStore, DistributionKeeper, DistributionStore, FeePool, GravityStore, StakingStore, StateDb,
};
use tracing::info;

/// Apply `genesis` to an empty database.
///
/// Fails without writing anything if the database already holds state or the
/// genesis document does not validate.
pub fn apply_genesis(db: &StateDb, genesis: &GenesisState) -> Result<(), GravityError> {
    if !db.is_empty() {
        return Err(GravityError::InvalidGenesis("state database is already initialised".into()));
    }
    genesis.validate()?;
    info!("applying gravity genesis state");

    let store = GravityStore::new();
    let staking = StakingStore::new();
    let bank = BankStore::new();
    let distribution = DistributionStore::new();
    let mut ctx = db.begin()?;

    // ── 1. Validators ────────────────────────────────────────────────────────
    for v in &genesis.validators {
        staking.set_validator_power(&mut ctx, &v.operator, v.power)?;
    }
    info!(validators = genesis.validators.len(), "genesis: validators bonded");

    // ── 2. Oracle state ──────────────────────────────────────────────────────
    for chain in &genesis.chains {
        store.set_last_observed_event_nonce(&mut ctx, &chain.chain_id, chain.last_observed_event_nonce);
        for vn in &chain.validator_nonces {
            store.set_last_event_nonce_by_validator(&mut ctx, &chain.chain_id, &vn.validator, vn.nonce);
        }
        for att in &chain.attestations {
            store.set_attestation(&mut ctx, att)?;
        }
        info!(
            chain_id = %chain.chain_id,
            last_observed = chain.last_observed_event_nonce,
            attestations = chain.attestations.len(),
            "genesis: chain oracle state imported"
        );
    }

    // ── 3. Balances ──────────────────────────────────────────────────────────
    for balance in &genesis.balances {
        bank.mint_to_account(&mut ctx, &balance.address, &balance.coins)?;
    }
    info!(accounts = genesis.balances.len(), "genesis: balances imported");

    // ── 4. Community pool ────────────────────────────────────────────────────
    bank.mint_coins(&mut ctx, DISTRIBUTION_MODULE, &genesis.community_pool)?;
    let community_pool = DecCoins::new(genesis.community_pool.iter().map(DecCoin::from_coin).collect())?;
    info!(pool = %community_pool, "genesis: community pool funded");
    distribution.set_fee_pool(&mut ctx, &FeePool { community_pool })?;

    for coin in &genesis.community_pool {
        let supply = bank.get_supply(&ctx, &coin.denom)?;
        info!(supply = %supply, "genesis: total supply");
    }

    ctx.commit()?;
    db.flush()?;
    info!("genesis state committed to disk");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gravity_core::attestation::{Attestation, ClaimHash};
    use gravity_core::coin::{Coin, Dec};
    use gravity_core::constants::ADDRESS_LEN;
    use gravity_core::types::{AccAddress, ChainId, ValAddress};
    use gravity_state::StakingKeeper;

    fn val(i: u8) -> ValAddress {
        ValAddress::from_bytes([i; ADDRESS_LEN])
    }

    fn sample() -> GenesisState {
        let eth = ChainId::new("eth").unwrap();
        GenesisState {
            validators: vec![
                GenesisValidator { operator: val(1), power: 10 },
                GenesisValidator { operator: val(2), power: 20 },
            ],
            chains: vec![ChainGenesis {
                chain_id: eth.clone(),
                last_observed_event_nonce: 5,
                validator_nonces: vec![ValidatorNonce { validator: val(1), nonce: 9 }],
                attestations: vec![Attestation {
                    chain_id: eth,
                    event_nonce: 9,
                    claim_hash: ClaimHash::of(b"deposit 9"),
                    height: 90,
                    observed: false,
                    votes: vec![val(1).to_bech32().unwrap()],
                }],
            }],
            balances: vec![GenesisBalance {
                address: AccAddress::from_bytes([7u8; ADDRESS_LEN]),
                coins: vec![Coin::new("ugrav", 50)],
            }],
            community_pool: vec![Coin::new("ugrav", 1000)],
        }
    }

    #[test]
    fn genesis_imports_everything() {
        let db = StateDb::open_temporary().unwrap();
        apply_genesis(&db, &sample()).unwrap();

        let ctx = db.begin().unwrap();
        let eth = ChainId::new("eth").unwrap();
        let store = GravityStore::new();
        assert_eq!(store.get_last_observed_event_nonce(&ctx, &eth).unwrap(), 5);
        assert_eq!(store.get_last_event_nonce_by_validator(&ctx, &eth, &val(1)).unwrap(), 9);
        assert_eq!(store.get_attestation_mapping(&ctx, &eth).unwrap().1, vec![9]);
        assert_eq!(
            StakingStore::new().get_bonded_validators_by_power(&ctx).unwrap(),
            vec![val(2), val(1)]
        );

        let bank = BankStore::new();
        assert_eq!(bank.get_supply(&ctx, "ugrav").unwrap().amount, 1050);
        let pool = DistributionStore::new().get_fee_pool(&ctx).unwrap();
        assert_eq!(pool.community_pool.amount_of("ugrav"), Dec::from_int(1000));
    }

    #[test]
    fn genesis_only_applies_once() {
        let db = StateDb::open_temporary().unwrap();
        apply_genesis(&db, &sample()).unwrap();
        assert!(matches!(apply_genesis(&db, &sample()), Err(GravityError::InvalidGenesis(_))));
    }

    #[test]
    fn corrupt_voter_rejected_at_import() {
        let mut genesis = sample();
        genesis.chains[0].attestations[0].votes.push("not-a-valoper".into());
        let db = StateDb::open_temporary().unwrap();
        assert!(apply_genesis(&db, &genesis).is_err());
        assert!(db.is_empty());
    }

    #[test]
    fn genesis_json_shape() {
        let json = serde_json::to_string(&sample()).unwrap();
        let back: GenesisState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample());

        let minimal: GenesisState = serde_json::from_str("{}").unwrap();
        assert!(minimal.validate().is_ok());
    }
}
