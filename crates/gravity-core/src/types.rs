use bech32::{Bech32, Hrp};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::constants::{ACCOUNT_HRP, ADDRESS_LEN, MAX_CHAIN_ID_LEN, VALIDATOR_HRP};
use crate::error::GravityError;

/// Sequence number validators assign to each externally observed event.
/// Strictly increasing per chain; 0 is reserved.
pub type EventNonce = u64;

/// Block height at which something was observed.
pub type Height = u64;

// ── ChainId ──────────────────────────────────────────────────────────────────

/// Opaque identifier of the external chain an attestation set belongs to.
///
/// Proposals may carry it either as a JSON string or as a JSON number; `5`
/// and `"5"` are the same chain. The text is otherwise kept byte for byte,
/// so surrounding whitespace is rejected rather than trimmed.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(String);

impl ChainId {
    pub fn new(id: impl Into<String>) -> Result<Self, GravityError> {
        let id = id.into();
        if id.is_empty() || id.len() > MAX_CHAIN_ID_LEN || id.trim() != id {
            return Err(GravityError::InvalidChainId(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainId({})", self.0)
    }
}

impl Serialize for ChainId {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }
        // Binary encodings are not self-describing; they always carry the
        // canonical string.
        let raw = if d.is_human_readable() {
            match Raw::deserialize(d)? {
                Raw::Text(s) => s,
                Raw::Number(n) => n.to_string(),
            }
        } else {
            String::deserialize(d)?
        };
        ChainId::new(raw).map_err(serde::de::Error::custom)
    }
}

// ── Bech32 helpers ───────────────────────────────────────────────────────────

fn encode_bech32(hrp: &str, bytes: &[u8]) -> Result<String, GravityError> {
    let hrp = Hrp::parse(hrp).map_err(|e| GravityError::InvalidAddress {
        address: hrp.to_string(),
        reason: e.to_string(),
    })?;
    bech32::encode::<Bech32>(hrp, bytes).map_err(|e| GravityError::InvalidAddress {
        address: hex::encode(bytes),
        reason: e.to_string(),
    })
}

fn decode_bech32(expected_hrp: &str, s: &str) -> Result<[u8; ADDRESS_LEN], GravityError> {
    let invalid = |reason: String| GravityError::InvalidAddress {
        address: s.to_string(),
        reason,
    };
    let (hrp, data) = bech32::decode(s.trim()).map_err(|e| invalid(e.to_string()))?;
    if hrp.as_str() != expected_hrp {
        return Err(invalid(format!(
            "expected prefix {expected_hrp}, got {}",
            hrp.as_str()
        )));
    }
    if data.len() != ADDRESS_LEN {
        return Err(invalid(format!(
            "expected {ADDRESS_LEN} bytes, got {}",
            data.len()
        )));
    }
    let mut arr = [0u8; ADDRESS_LEN];
    arr.copy_from_slice(&data);
    Ok(arr)
}

// ── AccAddress ───────────────────────────────────────────────────────────────

/// 20-byte account address, bech32-encoded with the `gravity` prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccAddress(pub [u8; ADDRESS_LEN]);

impl AccAddress {
    pub fn from_bytes(b: [u8; ADDRESS_LEN]) -> Self {
        Self(b)
    }

    /// Build from a slice that must be exactly `ADDRESS_LEN` bytes long.
    pub fn from_slice(b: &[u8]) -> Result<Self, GravityError> {
        let arr: [u8; ADDRESS_LEN] = b.try_into().map_err(|_| GravityError::InvalidAddress {
            address: hex::encode(b),
            reason: format!("expected {ADDRESS_LEN} bytes, got {}", b.len()),
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn from_bech32(s: &str) -> Result<Self, GravityError> {
        decode_bech32(ACCOUNT_HRP, s).map(Self)
    }

    pub fn to_bech32(&self) -> Result<String, GravityError> {
        encode_bech32(ACCOUNT_HRP, &self.0)
    }

    /// Deterministic address of a module account: the first 20 bytes of
    /// BLAKE3(module name).
    pub fn for_module(name: &str) -> Self {
        let digest = blake3::hash(name.as_bytes());
        let mut arr = [0u8; ADDRESS_LEN];
        arr.copy_from_slice(&digest.as_bytes()[..ADDRESS_LEN]);
        Self(arr)
    }
}

impl fmt::Display for AccAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_bech32() {
            Ok(s) => f.write_str(&s),
            Err(_) => f.write_str(&hex::encode(self.0)),
        }
    }
}

impl fmt::Debug for AccAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccAddress({})", hex::encode(self.0))
    }
}

impl Serialize for AccAddress {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let text = self.to_bech32().map_err(serde::ser::Error::custom)?;
        s.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for AccAddress {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        AccAddress::from_bech32(&s).map_err(serde::de::Error::custom)
    }
}

// ── ValAddress ───────────────────────────────────────────────────────────────

/// 20-byte validator operator address, bech32-encoded with the
/// `gravityvaloper` prefix. Attestation votes store this textual form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValAddress(pub [u8; ADDRESS_LEN]);

impl ValAddress {
    pub fn from_bytes(b: [u8; ADDRESS_LEN]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn from_bech32(s: &str) -> Result<Self, GravityError> {
        decode_bech32(VALIDATOR_HRP, s).map(Self)
    }

    pub fn to_bech32(&self) -> Result<String, GravityError> {
        encode_bech32(VALIDATOR_HRP, &self.0)
    }
}

impl fmt::Display for ValAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_bech32() {
            Ok(s) => f.write_str(&s),
            Err(_) => f.write_str(&hex::encode(self.0)),
        }
    }
}

impl fmt::Debug for ValAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValAddress({})", hex::encode(self.0))
    }
}

impl Serialize for ValAddress {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let text = self.to_bech32().map_err(serde::ser::Error::custom)?;
        s.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for ValAddress {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        ValAddress::from_bech32(&s).map_err(serde::de::Error::custom)
    }
}
