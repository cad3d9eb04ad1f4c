use primitive_types::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::constants::{DEC_PRECISION, DENOM_MAX_LEN, DENOM_MIN_LEN};
use crate::error::GravityError;

/// Integer coin amount. Summing `u64` airdrop amounts into a `u128` cannot
/// overflow for any list that fits in memory; additions are checked anyway.
pub type Int = u128;

// ── Denom validation ─────────────────────────────────────────────────────────

/// Ledger denom rule: `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`.
pub fn validate_denom(denom: &str) -> Result<(), GravityError> {
    let invalid = |reason| GravityError::InvalidDenom {
        denom: denom.to_string(),
        reason,
    };
    if denom.len() < DENOM_MIN_LEN || denom.len() > DENOM_MAX_LEN {
        return Err(invalid("length must be between 3 and 128"));
    }
    let mut chars = denom.chars();
    if !chars.next().map(|c| c.is_ascii_alphabetic()).unwrap_or(false) {
        return Err(invalid("must start with a letter"));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || "/:._-".contains(c)) {
        return Err(invalid("contains a disallowed character"));
    }
    Ok(())
}

// ── Dec ──────────────────────────────────────────────────────────────────────

/// Unsigned fixed-point decimal with 18 fractional digits, backed by a
/// 256-bit integer. Community-pool balances and airdrop accounting use this
/// type exclusively; there is no floating point anywhere in the path.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dec(U256);

impl Dec {
    fn precision_multiplier() -> U256 {
        U256::exp10(DEC_PRECISION as usize)
    }

    pub fn zero() -> Self {
        Self(U256::zero())
    }

    /// Exact conversion from an integer amount. 2^128 * 10^18 < 2^256, so
    /// this cannot overflow.
    pub fn from_int(n: Int) -> Self {
        Self(U256::from(n) * Self::precision_multiplier())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, other: Dec) -> Option<Dec> {
        self.0.checked_add(other.0).map(Dec)
    }

    pub fn checked_sub(self, other: Dec) -> Option<Dec> {
        self.0.checked_sub(other.0).map(Dec)
    }

    /// Integer part, discarding the fraction. `None` if it exceeds `u128`.
    pub fn truncate_int(&self) -> Option<Int> {
        let int = self.0 / Self::precision_multiplier();
        if int > U256::from(u128::MAX) {
            return None;
        }
        Some(int.low_u128())
    }
}

impl Default for Dec {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = Self::precision_multiplier();
        let int = self.0 / m;
        let frac = self.0 % m;
        write!(
            f,
            "{}.{:0>width$}",
            int,
            frac.to_string(),
            width = DEC_PRECISION as usize
        )
    }
}

impl fmt::Debug for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dec({self})")
    }
}

impl FromStr for Dec {
    type Err = GravityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || GravityError::InvalidCoin(s.to_string());
        let s = s.trim();
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty()
            || !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
            || frac_part.len() > DEC_PRECISION as usize
        {
            return Err(bad());
        }
        let int = U256::from_dec_str(int_part).map_err(|_| bad())?;
        let frac = if frac_part.is_empty() {
            U256::zero()
        } else {
            let padded = format!("{:0<width$}", frac_part, width = DEC_PRECISION as usize);
            U256::from_dec_str(&padded).map_err(|_| bad())?
        };
        int.checked_mul(Self::precision_multiplier())
            .and_then(|v| v.checked_add(frac))
            .map(Dec)
            .ok_or_else(bad)
    }
}

impl Serialize for Dec {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Dec {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ── Coin ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: Int,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: Int) -> Self {
        Self { denom: denom.into(), amount }
    }

    pub fn validate(&self) -> Result<(), GravityError> {
        validate_denom(&self.denom)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for Coin {
    type Err = GravityError;

    /// Parses `<amount><denom>`, e.g. `1000ugrav`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| GravityError::InvalidCoin(s.to_string()))?;
        let (amount, denom) = s.split_at(split);
        if amount.is_empty() {
            return Err(GravityError::InvalidCoin(s.to_string()));
        }
        let amount: Int = amount
            .parse()
            .map_err(|_| GravityError::InvalidCoin(s.to_string()))?;
        let denom = denom.trim();
        validate_denom(denom)?;
        Ok(Coin::new(denom, amount))
    }
}

/// Parse a comma-separated coin list, dropping zero amounts and sorting by
/// denom. Duplicate denoms are rejected.
pub fn parse_coins_normalized(s: &str) -> Result<Vec<Coin>, GravityError> {
    let mut coins = Vec::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let coin: Coin = part.parse()?;
        if coin.amount > 0 {
            coins.push(coin);
        }
    }
    coins.sort_by(|a, b| a.denom.cmp(&b.denom));
    if coins.windows(2).any(|w| w[0].denom == w[1].denom) {
        return Err(GravityError::InvalidCoin(format!("duplicate denomination in {s}")));
    }
    Ok(coins)
}

// ── DecCoin / DecCoins ───────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecCoin {
    pub denom: String,
    pub amount: Dec,
}

impl DecCoin {
    pub fn new(denom: impl Into<String>, amount: Dec) -> Self {
        Self { denom: denom.into(), amount }
    }

    pub fn from_coin(coin: &Coin) -> Self {
        Self::new(coin.denom.clone(), Dec::from_int(coin.amount))
    }
}

impl fmt::Display for DecCoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// A sorted set of decimal coins with no zero entries and no duplicate
/// denoms. The community pool is held in this form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DecCoin>", into = "Vec<DecCoin>")]
pub struct DecCoins(Vec<DecCoin>);

impl DecCoins {
    /// Builds a normalised set. Duplicate denoms are merged; overflow while
    /// merging is an error.
    pub fn new(coins: Vec<DecCoin>) -> Result<Self, GravityError> {
        let mut out = DecCoins::default();
        for c in coins {
            out = out
                .checked_add_coin(&c)
                .ok_or(GravityError::Overflow("merging dec coins"))?;
        }
        Ok(out)
    }

    pub fn amount_of(&self, denom: &str) -> Dec {
        self.0
            .iter()
            .find(|c| c.denom == denom)
            .map(|c| c.amount)
            .unwrap_or_else(Dec::zero)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecCoin> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn checked_add_coin(&self, coin: &DecCoin) -> Option<DecCoins> {
        let mut coins = self.0.clone();
        match coins.binary_search_by(|c| c.denom.as_str().cmp(&coin.denom)) {
            Ok(i) => coins[i].amount = coins[i].amount.checked_add(coin.amount)?,
            Err(i) => coins.insert(i, coin.clone()),
        }
        coins.retain(|c| !c.amount.is_zero());
        Some(DecCoins(coins))
    }

    /// Subtracts `other` denom by denom. The flag is `true` when any denom
    /// would go negative; in that case the returned set is unchanged and
    /// must not be used.
    pub fn safe_sub(&self, other: &DecCoins) -> (DecCoins, bool) {
        let mut coins = self.0.clone();
        for sub in other.iter() {
            match coins.binary_search_by(|c| c.denom.as_str().cmp(&sub.denom)) {
                Ok(i) => match coins[i].amount.checked_sub(sub.amount) {
                    Some(rest) => coins[i].amount = rest,
                    None => return (self.clone(), true),
                },
                Err(_) if sub.amount.is_zero() => {}
                Err(_) => return (self.clone(), true),
            }
        }
        coins.retain(|c| !c.amount.is_zero());
        (DecCoins(coins), false)
    }
}

impl TryFrom<Vec<DecCoin>> for DecCoins {
    type Error = GravityError;

    fn try_from(coins: Vec<DecCoin>) -> Result<Self, Self::Error> {
        DecCoins::new(coins)
    }
}

impl From<DecCoins> for Vec<DecCoin> {
    fn from(coins: DecCoins) -> Self {
        coins.0
    }
}

impl fmt::Display for DecCoins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        f.write_str(&parts.join(","))
    }
}
