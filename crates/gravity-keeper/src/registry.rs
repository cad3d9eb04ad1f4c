//! Process-wide governance proposal-type registry.
//!
//! The authoring CLI and the node both register the gravity proposal types
//! at startup, possibly in the same process, so registration is
//! register-if-absent and never fails on a repeat.

use gravity_core::constants::PROPOSAL_ROUTE_PREFIX;
use gravity_core::proposal::ProposalKind;
use once_cell::sync::Lazy;
use std::collections::BTreeSet;
use std::sync::RwLock;
use tracing::debug;

static REGISTRY: Lazy<RwLock<BTreeSet<String>>> = Lazy::new(|| RwLock::new(BTreeSet::new()));

/// Add `name` to the registry. Returns `true` if it was not already present.
pub fn register_if_absent(name: &str) -> bool {
    // A poisoned lock still holds a consistent set; keep using it.
    let mut set = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
    set.insert(name.to_string())
}

pub fn is_registered(name: &str) -> bool {
    let set = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
    set.contains(name)
}

/// Register every gravity proposal type under its route name with the
/// `gravity/` prefix stripped. Safe to call any number of times.
pub fn register_proposal_types() {
    for kind in ProposalKind::ALL {
        let route = kind.route();
        let name = route.strip_prefix(PROPOSAL_ROUTE_PREFIX).unwrap_or(route);
        if register_if_absent(name) {
            debug!(proposal_type = name, "registered proposal type");
        }
    }
}
