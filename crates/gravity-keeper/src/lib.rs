//! gravity-keeper
//!
//! Governance-driven recovery for the gravity bridge: rolling oracle history
//! back after an external-chain halt, and conservation-checked airdrops from
//! the community pool. Proposals arrive through `governance::execute_proposal`,
//! which runs the handler inside one `Context` and commits only on success.

pub mod airdrop;
pub mod governance;
pub mod keeper;
pub mod registry;
pub mod unhalt;

#[cfg(test)]
pub(crate) mod testutil;

pub use airdrop::AirdropReport;
pub use governance::{execute_proposal, execute_submission, Outcome};
pub use keeper::{Keeper, StoreKeeper};
pub use registry::{is_registered, register_if_absent, register_proposal_types};
pub use unhalt::PruneReport;
