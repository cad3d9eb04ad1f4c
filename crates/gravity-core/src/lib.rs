pub mod constants;
pub mod error;
pub mod types;
pub mod coin;
pub mod attestation;
pub mod proposal;

pub use constants::*;
pub use error::{ErrorClass, GravityError};
pub use types::*;
pub use coin::*;
pub use attestation::*;
pub use proposal::*;
