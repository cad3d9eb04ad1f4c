use serde::{Deserialize, Serialize};

use crate::types::{ChainId, EventNonce, Height};

/// 32-byte BLAKE3 commitment to the body of a claimed external event.
/// Competing claims at the same nonce differ only in this hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClaimHash(#[serde(with = "hex::serde")] pub [u8; 32]);

impl ClaimHash {
    pub fn of(claim_body: &[u8]) -> Self {
        Self(*blake3::hash(claim_body).as_bytes())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Debug for ClaimHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ClaimHash({}…)", &self.to_hex()[..16])
    }
}

/// A record that one or more validators claim a specific external event
/// occurred at a specific nonce.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub chain_id: ChainId,
    pub event_nonce: EventNonce,
    pub claim_hash: ClaimHash,
    /// Height at which the first vote was recorded.
    pub height: Height,
    /// Set once the claim crossed the voting-power threshold.
    #[serde(default)]
    pub observed: bool,
    /// Bech32 validator operator addresses, in vote order.
    pub votes: Vec<String>,
}
