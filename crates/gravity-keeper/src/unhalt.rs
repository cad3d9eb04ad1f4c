use gravity_core::error::GravityError;
use gravity_core::proposal::UnhaltBridgeProposal;
use gravity_core::types::{ChainId, EventNonce, ValAddress};
use gravity_state::{Context, StakingKeeper};
use std::collections::HashSet;
use tracing::{error, info};

use crate::keeper::Keeper;

/// What a successful rollback did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub deleted_attestations: usize,
    /// Distinct validators that voted on at least one deleted attestation.
    pub affected_validators: usize,
    /// Affected validators whose last event nonce was lowered to the target.
    pub reset_validators: usize,
}

impl<S: StakingKeeper, B, D> Keeper<S, B, D> {
    /// Governance entry point for `gravity/UnhaltBridge`.
    pub fn handle_unhalt_bridge_proposal(
        &self,
        ctx: &mut Context,
        proposal: &UnhaltBridgeProposal,
    ) -> Result<PruneReport, GravityError> {
        info!(
            chain_id = %proposal.chain_id,
            target_nonce = proposal.target_nonce,
            "gov vote passed: resetting oracle history"
        );
        self.prune_attestations_after_nonce(ctx, &proposal.chain_id, proposal.target_nonce)
    }

    /// Discard every attestation above `target` on `chain_id` and pull the
    /// last event nonce of every validator that voted on a discarded
    /// attestation down to `target`.
    ///
    /// Rolling back to nonce 0 or below the last observed nonce is rejected
    /// before anything is touched. A voter that is not a valid validator
    /// address means the store is corrupt; that aborts with
    /// `CorruptValidatorAddress` and the caller must not commit.
    pub fn prune_attestations_after_nonce(
        &self,
        ctx: &mut Context,
        chain_id: &ChainId,
        target: EventNonce,
    ) -> Result<PruneReport, GravityError> {
        let last_observed = self.store.get_last_observed_event_nonce(ctx, chain_id)?;
        if target == 0 {
            error!(%chain_id, last_observed, nonce = target, "attempted to reset to nonce 0, which is reserved");
            return Err(GravityError::ZeroTargetNonce(target));
        }
        if target < last_observed {
            error!(
                %chain_id,
                last_observed,
                nonce = target,
                "attempted to reset to a nonce before the last observed event nonce"
            );
            return Err(GravityError::TargetBeforeLastObserved { target, last_observed });
        }

        let bonded = self.staking.get_bonded_validators_by_power(ctx)?;
        let mut affected: HashSet<String> = HashSet::with_capacity(bonded.len());
        let mut report = PruneReport::default();

        // ── Delete every claim above the target ──────────────────────────────
        let (mapping, nonces) = self.store.get_attestation_mapping(ctx, chain_id)?;
        let first_pruned = nonces.partition_point(|n| *n <= target);
        for nonce in &nonces[first_pruned..] {
            let Some(atts) = mapping.get(nonce) else { continue };
            for att in atts {
                info!(%chain_id, nonce, height = att.height, "deleting attestation");
                affected.extend(att.votes.iter().cloned());
                self.store.delete_attestation(ctx, att);
                report.deleted_attestations += 1;
            }
        }

        // ── Reset affected validators ────────────────────────────────────────
        let mut voters: Vec<String> = affected.into_iter().collect();
        voters.sort_unstable();
        report.affected_validators = voters.len();
        for voter in &voters {
            let validator = ValAddress::from_bech32(voter).map_err(|e| {
                error!(critical = true, %chain_id, address = %voter, "invalid validator address affected by bridge reset");
                GravityError::CorruptValidatorAddress {
                    address: voter.clone(),
                    reason: e.to_string(),
                }
            })?;
            let last = self.store.get_last_event_nonce_by_validator(ctx, chain_id, &validator)?;
            if last > target {
                info!(%chain_id, validator = %voter, from = last, to = target, "resetting validator event nonce");
                self.store
                    .set_last_event_nonce_by_validator(ctx, chain_id, &validator, target);
                report.reset_validators += 1;
            }
        }

        info!(
            %chain_id,
            target,
            deleted = report.deleted_attestations,
            affected = report.affected_validators,
            reset = report.reset_validators,
            "oracle history pruned"
        );
        Ok(report)
    }
}
