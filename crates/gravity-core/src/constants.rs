/// ─── Gravity Module Constants ───────────────────────────────────────────────
///
/// Chain-wide parameters shared by the keeper, the state layer and the
/// authoring tools. None of these are governance-adjustable.

// ── Module identity ──────────────────────────────────────────────────────────

/// Name of the bridge module; also the governance route key.
pub const MODULE_NAME: &str = "gravity";

/// Prefix every gravity proposal type URL carries (`gravity/Airdrop`, ...).
pub const PROPOSAL_ROUTE_PREFIX: &str = "gravity/";

/// Module account that custodies the community pool.
pub const DISTRIBUTION_MODULE: &str = "distribution";

/// Module account that escrows proposal deposits.
pub const GOV_MODULE: &str = "gov";

/// Module account that custodies bridged-in tokens.
pub const GRAVITY_MODULE: &str = "gravity";

// ── Addresses ────────────────────────────────────────────────────────────────

/// Raw width of every account and validator address. Airdrop recipients are
/// packed back-to-back at this width.
pub const ADDRESS_LEN: usize = 20;

/// Bech32 human-readable prefix for account addresses.
pub const ACCOUNT_HRP: &str = "gravity";

/// Bech32 human-readable prefix for validator operator addresses.
pub const VALIDATOR_HRP: &str = "gravityvaloper";

/// Longest accepted external chain identifier, in bytes. Store keys carry
/// the length in a single byte.
pub const MAX_CHAIN_ID_LEN: usize = 128;

// ── Coins ────────────────────────────────────────────────────────────────────

/// Fractional digits carried by `Dec` (matches the ledger's LegacyDec).
pub const DEC_PRECISION: u32 = 18;

/// Minimum / maximum denom length accepted by `validate_denom`.
pub const DENOM_MIN_LEN: usize = 3;
pub const DENOM_MAX_LEN: usize = 128;

// ── Governance content ───────────────────────────────────────────────────────

pub const MAX_TITLE_LEN: usize = 140;
pub const MAX_DESCRIPTION_LEN: usize = 10_000;
