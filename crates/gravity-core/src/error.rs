use thiserror::Error;

use crate::types::EventNonce;

/// Coarse classification used for logging and for deciding whether a
/// failure can be retried by resubmitting a corrected proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed payload. Nothing was mutated.
    Input,
    /// Well-formed but disallowed request. Nothing was mutated.
    Policy,
    /// Accounting or store corruption. Must never be silently ignored.
    Invariant,
    /// Unrecognised proposal content.
    Unknown,
    /// Backend failure.
    Storage,
}

#[derive(Debug, Error)]
pub enum GravityError {
    // ── Input errors ─────────────────────────────────────────────────────────
    #[error("invalid denom {denom:?}: {reason}")]
    InvalidDenom { denom: String, reason: &'static str },

    #[error("invalid recipients: {len} packed bytes for {amounts} amounts (address width {width})")]
    InvalidRecipients { len: usize, amounts: usize, width: usize },

    #[error("invalid bech32 address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("invalid coin {0:?}")]
    InvalidCoin(String),

    #[error("unexpected coin amounts, expecting exactly 1 coin for {what}, got {got}")]
    NotSingleCoin { what: &'static str, got: usize },

    #[error("invalid chain id: {0:?}")]
    InvalidChainId(String),

    #[error("invalid proposal content: {0}")]
    InvalidProposal(String),

    #[error("malformed proposal payload: {0}")]
    MalformedPayload(String),

    #[error("blocked recipient {0}: module accounts cannot receive airdrops")]
    BlockedRecipient(String),

    #[error("insufficient funds in module {module}: need {need}{denom}, have {have}{denom}")]
    InsufficientModuleFunds { module: String, denom: String, need: u128, have: u128 },

    #[error("invalid genesis: {0}")]
    InvalidGenesis(String),

    // ── Policy errors ────────────────────────────────────────────────────────
    #[error("invalid target nonce {0}: nonce 0 is reserved")]
    ZeroTargetNonce(EventNonce),

    #[error("cannot reset to nonce {target}: last observed event nonce is {last_observed}")]
    TargetBeforeLastObserved { target: EventNonce, last_observed: EventNonce },

    #[error("insufficient tokens in community pool: need {need}{denom}, pool holds {available}{denom}")]
    InsufficientCommunityPool { denom: String, need: String, available: String },

    // ── Invariant violations ─────────────────────────────────────────────────
    #[error("invalid validator address {address:?} affected by bridge reset: {reason}")]
    CorruptValidatorAddress { address: String, reason: String },

    #[error("invalid amount sent: required {required}, sent {sent}")]
    AmountSentMismatch { required: String, sent: String },

    #[error("total chain supply of {denom} has changed: {before} -> {after}")]
    SupplyChanged { denom: String, before: u128, after: u128 },

    #[error("community pool underflow subtracting {0}")]
    CommunityPoolUnderflow(String),

    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    // ── Dispatch ─────────────────────────────────────────────────────────────
    #[error("unrecognized gravity proposal content type: {0}")]
    UnknownProposalType(String),

    // ── Serialization / storage ──────────────────────────────────────────────
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl GravityError {
    pub fn class(&self) -> ErrorClass {
        use GravityError::*;
        match self {
            InvalidDenom { .. }
            | InvalidRecipients { .. }
            | InvalidAddress { .. }
            | InvalidCoin(_)
            | NotSingleCoin { .. }
            | InvalidChainId(_)
            | InvalidProposal(_)
            | MalformedPayload(_)
            | BlockedRecipient(_)
            | InsufficientModuleFunds { .. }
            | InvalidGenesis(_) => ErrorClass::Input,

            ZeroTargetNonce(_)
            | TargetBeforeLastObserved { .. }
            | InsufficientCommunityPool { .. } => ErrorClass::Policy,

            CorruptValidatorAddress { .. }
            | AmountSentMismatch { .. }
            | SupplyChanged { .. }
            | CommunityPoolUnderflow(_)
            | Overflow(_) => ErrorClass::Invariant,

            UnknownProposalType(_) => ErrorClass::Unknown,

            Serialization(_) | Storage(_) => ErrorClass::Storage,
        }
    }

    /// True for failures that indicate corrupted state or broken accounting.
    pub fn is_critical(&self) -> bool {
        self.class() == ErrorClass::Invariant
    }
}
