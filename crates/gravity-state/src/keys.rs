//! Key layout of the `state` tree.
//!
//! Every key starts with a one-byte store prefix. Chain ids are written
//! length-prefixed so one chain's keyspace is never a prefix of another's,
//! and nonces / powers are big-endian so byte order equals numeric order.

use gravity_core::attestation::ClaimHash;
use gravity_core::constants::ADDRESS_LEN;
use gravity_core::types::{AccAddress, ChainId, EventNonce, ValAddress};

/// Single key holding the committed block height.
pub const HEIGHT: &[u8] = &[0x00];
pub const ATTESTATION: u8 = 0x01;
pub const LAST_EVENT_NONCE_BY_VALIDATOR: u8 = 0x02;
pub const LAST_OBSERVED_EVENT_NONCE: u8 = 0x03;
pub const BALANCE: u8 = 0x10;
pub const SUPPLY: u8 = 0x11;
pub const FEE_POOL: u8 = 0x20;
pub const VALIDATOR_BY_POWER: u8 = 0x30;
pub const VALIDATOR_POWER: u8 = 0x31;

fn with_chain(prefix: u8, chain_id: &ChainId) -> Vec<u8> {
    let id = chain_id.as_str().as_bytes();
    let mut key = Vec::with_capacity(2 + id.len() + 8 + 32);
    key.push(prefix);
    // ChainId::new caps the length well below 256.
    key.push(id.len() as u8);
    key.extend_from_slice(id);
    key
}

// ── Attestations ─────────────────────────────────────────────────────────────

pub fn attestation_chain_prefix(chain_id: &ChainId) -> Vec<u8> {
    with_chain(ATTESTATION, chain_id)
}

pub fn attestation_key(chain_id: &ChainId, nonce: EventNonce, claim_hash: &ClaimHash) -> Vec<u8> {
    let mut key = attestation_chain_prefix(chain_id);
    key.extend_from_slice(&nonce.to_be_bytes());
    key.extend_from_slice(&claim_hash.0);
    key
}

/// Recover the nonce from a key produced by `attestation_key`.
pub fn nonce_from_attestation_key(chain_id: &ChainId, key: &[u8]) -> Option<EventNonce> {
    let start = attestation_chain_prefix(chain_id).len();
    let bytes: [u8; 8] = key.get(start..start + 8)?.try_into().ok()?;
    Some(EventNonce::from_be_bytes(bytes))
}

// ── Event nonces ─────────────────────────────────────────────────────────────

pub fn last_event_nonce_prefix(chain_id: &ChainId) -> Vec<u8> {
    with_chain(LAST_EVENT_NONCE_BY_VALIDATOR, chain_id)
}

pub fn last_event_nonce_key(chain_id: &ChainId, validator: &ValAddress) -> Vec<u8> {
    let mut key = last_event_nonce_prefix(chain_id);
    key.extend_from_slice(validator.as_bytes());
    key
}

pub fn validator_from_last_event_nonce_key(chain_id: &ChainId, key: &[u8]) -> Option<ValAddress> {
    let start = last_event_nonce_prefix(chain_id).len();
    let bytes: [u8; ADDRESS_LEN] = key.get(start..start + ADDRESS_LEN)?.try_into().ok()?;
    Some(ValAddress::from_bytes(bytes))
}

pub fn last_observed_event_nonce_key(chain_id: &ChainId) -> Vec<u8> {
    with_chain(LAST_OBSERVED_EVENT_NONCE, chain_id)
}

// ── Bank ─────────────────────────────────────────────────────────────────────

pub fn balance_prefix(addr: &AccAddress) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + ADDRESS_LEN + 16);
    key.push(BALANCE);
    key.extend_from_slice(addr.as_bytes());
    key
}

pub fn balance_key(addr: &AccAddress, denom: &str) -> Vec<u8> {
    let mut key = balance_prefix(addr);
    key.extend_from_slice(denom.as_bytes());
    key
}

pub fn supply_key(denom: &str) -> Vec<u8> {
    let mut key = vec![SUPPLY];
    key.extend_from_slice(denom.as_bytes());
    key
}

// ── Distribution ─────────────────────────────────────────────────────────────

pub fn fee_pool_key() -> Vec<u8> {
    vec![FEE_POOL]
}

// ── Staking ──────────────────────────────────────────────────────────────────

/// Power is stored inverted so an ascending scan yields the highest power
/// first; ties fall back to address order.
pub fn validator_by_power_key(power: u64, validator: &ValAddress) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + 8 + ADDRESS_LEN);
    key.push(VALIDATOR_BY_POWER);
    key.extend_from_slice(&(u64::MAX - power).to_be_bytes());
    key.extend_from_slice(validator.as_bytes());
    key
}

pub fn validator_from_power_key(key: &[u8]) -> Option<ValAddress> {
    let bytes: [u8; ADDRESS_LEN] = key.get(9..9 + ADDRESS_LEN)?.try_into().ok()?;
    Some(ValAddress::from_bytes(bytes))
}

pub fn validator_power_key(validator: &ValAddress) -> Vec<u8> {
    let mut key = vec![VALIDATOR_POWER];
    key.extend_from_slice(validator.as_bytes());
    key
}
