use gravity_core::attestation::{Attestation, ClaimHash};
use gravity_core::error::GravityError;
use gravity_core::types::{ChainId, EventNonce, ValAddress};
use std::collections::BTreeMap;

use crate::context::Context;
use crate::keys;

/// Nonce → every attestation stored at that nonce (competing claims included).
pub type AttestationMapping = BTreeMap<EventNonce, Vec<Attestation>>;

/// Accessors for the gravity module's own state: the attestation store and
/// the event-nonce ledger. No cross-validation happens here; callers enforce
/// their own invariants.
#[derive(Clone, Copy, Debug, Default)]
pub struct GravityStore;

impl GravityStore {
    pub fn new() -> Self {
        Self
    }

    // ── Attestations ──────────────────────────────────────────────────────────

    pub fn get_attestation(
        &self,
        ctx: &Context,
        chain_id: &ChainId,
        nonce: EventNonce,
        claim_hash: &ClaimHash,
    ) -> Result<Option<Attestation>, GravityError> {
        ctx.get_typed(&keys::attestation_key(chain_id, nonce, claim_hash))
    }

    pub fn set_attestation(&self, ctx: &mut Context, att: &Attestation) -> Result<(), GravityError> {
        let key = keys::attestation_key(&att.chain_id, att.event_nonce, &att.claim_hash);
        ctx.set_typed(key, att)
    }

    /// Removes exactly this record. Callers must not delete the same record
    /// twice.
    pub fn delete_attestation(&self, ctx: &mut Context, att: &Attestation) {
        ctx.delete(&keys::attestation_key(&att.chain_id, att.event_nonce, &att.claim_hash));
    }

    /// Every attestation for `chain_id`, grouped by nonce, plus the nonces in
    /// ascending numeric order.
    pub fn get_attestation_mapping(
        &self,
        ctx: &Context,
        chain_id: &ChainId,
    ) -> Result<(AttestationMapping, Vec<EventNonce>), GravityError> {
        let mut mapping = AttestationMapping::new();
        for (key, value) in ctx.iter_prefix(&keys::attestation_chain_prefix(chain_id))? {
            let att: Attestation = bincode::deserialize(&value)
                .map_err(|e| GravityError::Serialization(e.to_string()))?;
            let nonce = keys::nonce_from_attestation_key(chain_id, &key).ok_or_else(|| {
                GravityError::Storage(format!("malformed attestation key {}", hex::encode(&key)))
            })?;
            mapping.entry(nonce).or_default().push(att);
        }
        let nonces = mapping.keys().copied().collect();
        Ok((mapping, nonces))
    }

    // ── Event nonces ──────────────────────────────────────────────────────────

    pub fn get_last_observed_event_nonce(
        &self,
        ctx: &Context,
        chain_id: &ChainId,
    ) -> Result<EventNonce, GravityError> {
        Ok(ctx.get_u64(&keys::last_observed_event_nonce_key(chain_id))?.unwrap_or(0))
    }

    pub fn set_last_observed_event_nonce(&self, ctx: &mut Context, chain_id: &ChainId, nonce: EventNonce) {
        ctx.set_u64(keys::last_observed_event_nonce_key(chain_id), nonce);
    }

    /// 0 if the validator has never voted on this chain.
    pub fn get_last_event_nonce_by_validator(
        &self,
        ctx: &Context,
        chain_id: &ChainId,
        validator: &ValAddress,
    ) -> Result<EventNonce, GravityError> {
        Ok(ctx
            .get_u64(&keys::last_event_nonce_key(chain_id, validator))?
            .unwrap_or(0))
    }

    pub fn set_last_event_nonce_by_validator(
        &self,
        ctx: &mut Context,
        chain_id: &ChainId,
        validator: &ValAddress,
        nonce: EventNonce,
    ) {
        ctx.set_u64(keys::last_event_nonce_key(chain_id, validator), nonce);
    }

    /// Every recorded per-validator nonce for `chain_id`, by validator address.
    pub fn last_event_nonces(
        &self,
        ctx: &Context,
        chain_id: &ChainId,
    ) -> Result<Vec<(ValAddress, EventNonce)>, GravityError> {
        let mut out = Vec::new();
        for (key, value) in ctx.iter_prefix(&keys::last_event_nonce_prefix(chain_id))? {
            let validator = keys::validator_from_last_event_nonce_key(chain_id, &key).ok_or_else(|| {
                GravityError::Storage(format!("malformed nonce key {}", hex::encode(&key)))
            })?;
            let arr: [u8; 8] = value
                .as_slice()
                .try_into()
                .map_err(|_| GravityError::Serialization("corrupt event nonce".into()))?;
            out.push((validator, EventNonce::from_be_bytes(arr)));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StateDb;
    use gravity_core::constants::ADDRESS_LEN;

    fn att(chain: &ChainId, nonce: EventNonce, claim: u8, votes: Vec<String>) -> Attestation {
        Attestation {
            chain_id: chain.clone(),
            event_nonce: nonce,
            claim_hash: ClaimHash([claim; 32]),
            height: nonce * 10,
            observed: false,
            votes,
        }
    }

    #[test]
    fn mapping_is_grouped_and_ascending() {
        let db = StateDb::open_temporary().unwrap();
        let store = GravityStore::new();
        let eth = ChainId::new("eth").unwrap();
        let other = ChainId::new("polygon").unwrap();
        let mut ctx = db.begin().unwrap();

        // Inserted out of order, with two competing claims at nonce 300.
        for a in [
            att(&eth, 300, 1, vec![]),
            att(&eth, 2, 1, vec![]),
            att(&eth, 300, 2, vec![]),
            att(&eth, 256, 1, vec![]),
            att(&other, 1, 1, vec![]),
        ] {
            store.set_attestation(&mut ctx, &a).unwrap();
        }

        let (mapping, nonces) = store.get_attestation_mapping(&ctx, &eth).unwrap();
        assert_eq!(nonces, vec![2, 256, 300]);
        assert_eq!(mapping[&300].len(), 2);

        ctx.commit().unwrap();
        let ctx = db.begin().unwrap();
        let (_, nonces) = store.get_attestation_mapping(&ctx, &eth).unwrap();
        assert_eq!(nonces, vec![2, 256, 300]);
    }

    #[test]
    fn delete_removes_exactly_one_claim() {
        let db = StateDb::open_temporary().unwrap();
        let store = GravityStore::new();
        let eth = ChainId::new("eth").unwrap();
        let mut ctx = db.begin().unwrap();
        let a = att(&eth, 5, 1, vec![]);
        let b = att(&eth, 5, 2, vec![]);
        store.set_attestation(&mut ctx, &a).unwrap();
        store.set_attestation(&mut ctx, &b).unwrap();

        store.delete_attestation(&mut ctx, &a);
        assert!(store.get_attestation(&ctx, &eth, 5, &a.claim_hash).unwrap().is_none());
        assert_eq!(store.get_attestation(&ctx, &eth, 5, &b.claim_hash).unwrap(), Some(b));
    }

    #[test]
    fn validator_nonce_defaults_to_zero() {
        let db = StateDb::open_temporary().unwrap();
        let store = GravityStore::new();
        let eth = ChainId::new("eth").unwrap();
        let val = ValAddress::from_bytes([4u8; ADDRESS_LEN]);
        let mut ctx = db.begin().unwrap();

        assert_eq!(store.get_last_event_nonce_by_validator(&ctx, &eth, &val).unwrap(), 0);
        store.set_last_event_nonce_by_validator(&mut ctx, &eth, &val, 42);
        assert_eq!(store.get_last_event_nonce_by_validator(&ctx, &eth, &val).unwrap(), 42);
        assert_eq!(store.last_event_nonces(&ctx, &eth).unwrap(), vec![(val, 42)]);

        assert_eq!(store.get_last_observed_event_nonce(&ctx, &eth).unwrap(), 0);
        store.set_last_observed_event_nonce(&mut ctx, &eth, 40);
        assert_eq!(store.get_last_observed_event_nonce(&ctx, &eth).unwrap(), 40);
    }
}
