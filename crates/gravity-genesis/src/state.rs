use gravity_core::attestation::Attestation;
use gravity_core::coin::Coin;
use gravity_core::error::GravityError;
use gravity_core::types::{AccAddress, ChainId, EventNonce, ValAddress};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisValidator {
    pub operator: ValAddress,
    pub power: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorNonce {
    pub validator: ValAddress,
    pub nonce: EventNonce,
}

/// Oracle state for one external chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainGenesis {
    pub chain_id: ChainId,
    #[serde(default)]
    pub last_observed_event_nonce: EventNonce,
    #[serde(default)]
    pub validator_nonces: Vec<ValidatorNonce>,
    #[serde(default)]
    pub attestations: Vec<Attestation>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisBalance {
    pub address: AccAddress,
    pub coins: Vec<Coin>,
}

/// Initial chain state, read from a JSON file by `gravityd init`.
///
/// `community_pool` is minted into the distribution module account and
/// recorded in the fee pool, so the pool is fully backed from block one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    #[serde(default)]
    pub validators: Vec<GenesisValidator>,
    #[serde(default)]
    pub chains: Vec<ChainGenesis>,
    #[serde(default)]
    pub balances: Vec<GenesisBalance>,
    #[serde(default)]
    pub community_pool: Vec<Coin>,
}

fn invalid(msg: impl Into<String>) -> GravityError {
    GravityError::InvalidGenesis(msg.into())
}

impl GenesisState {
    /// Structural checks that need no store access.
    pub fn validate(&self) -> Result<(), GravityError> {
        let mut seen = BTreeSet::new();
        for v in &self.validators {
            if !seen.insert(v.operator) {
                return Err(invalid(format!("duplicate validator {}", v.operator)));
            }
            if v.power == 0 {
                return Err(invalid(format!("validator {} has zero power", v.operator)));
            }
        }

        let mut chains = BTreeSet::new();
        for chain in &self.chains {
            if !chains.insert(chain.chain_id.as_str()) {
                return Err(invalid(format!("duplicate chain {}", chain.chain_id)));
            }
            for att in &chain.attestations {
                if att.chain_id != chain.chain_id {
                    return Err(invalid(format!(
                        "attestation at nonce {} belongs to {}, listed under {}",
                        att.event_nonce, att.chain_id, chain.chain_id
                    )));
                }
                if att.event_nonce == 0 {
                    return Err(invalid(format!("attestation on {} at reserved nonce 0", chain.chain_id)));
                }
                // Voters are re-parsed during rollback; reject bad ones now.
                for voter in &att.votes {
                    ValAddress::from_bech32(voter)?;
                }
            }
        }

        for balance in &self.balances {
            for coin in &balance.coins {
                coin.validate()?;
            }
        }
        for coin in &self.community_pool {
            coin.validate()?;
        }
        Ok(())
    }
}
