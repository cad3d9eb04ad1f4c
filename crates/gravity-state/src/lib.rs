//! gravity-state
//!
//! Persistent state for the gravity module and the minimal bank,
//! distribution and staking stores it collaborates with. Everything is
//! written through a `Context`, a write-buffered branch of the `StateDb`
//! that commits atomically or not at all.

pub mod bank;
pub mod context;
pub mod db;
pub mod distribution;
pub mod expected;
pub mod gravity;
pub mod keys;
pub mod staking;

pub use bank::BankStore;
pub use context::Context;
pub use db::StateDb;
pub use distribution::{DistributionStore, FeePool};
pub use expected::{BankKeeper, DistributionKeeper, StakingKeeper};
pub use gravity::GravityStore;
pub use staking::StakingStore;
