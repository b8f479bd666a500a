//! Core types for the token ledger
//!
//! Addresses are opaque 32-byte identifiers; amounts are unsigned
//! integers with checked arithmetic (see the `math` module). All public
//! types serialize deterministically, with addresses rendered as hex
//! strings and amounts as decimal strings (TOML/JSON integers are i64).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Token amount.
///
/// The alias is the single width-configuration point for the crate:
/// every balance, allowance and supply figure is an `Amount`, and all
/// arithmetic on them goes through the checked `math` operations.
pub type Amount = u128;

/// Opaque 32-byte account identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 32]);

impl Address {
    /// The zero (null) identifier
    pub const ZERO: Address = Address([0u8; 32]);

    /// Create from raw bytes
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// True for the zero identifier
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped)
            .map_err(|e| crate::Error::Config(format!("invalid address hex: {}", e)))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| crate::Error::Config("address must be 32 bytes".to_string()))?;
        Ok(Address(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Serde helper: amounts as decimal strings
pub mod amount_string {
    use super::Amount;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize an amount as its decimal string
    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(amount)
    }

    /// Deserialize an amount from a decimal string
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Outbound notification emitted after a successful mutation
///
/// Exactly one batch of notifications is produced per successful mutating
/// call, in mutation order; a failed call never emits. Mint and burn are
/// reported as transfers from/to the null side (`None`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    /// Funds moved; `from: None` is a mint, `to: None` is a burn
    Transfer {
        /// Debited account, absent for mint
        from: Option<Address>,
        /// Credited account, absent for burn
        to: Option<Address>,
        /// Amount moved
        #[serde(with = "amount_string")]
        amount: Amount,
    },

    /// Allowance set or adjusted; carries the post-operation amount
    Approval {
        /// Account granting the allowance
        owner: Address,
        /// Account permitted to spend it
        spender: Address,
        /// Remaining authorization after the call
        #[serde(with = "amount_string")]
        amount: Amount,
    },

    /// Authority seat changed hands; `next: None` is a renounce,
    /// `previous: None` a claim of a vacant seat
    AuthorityChanged {
        /// Prior holder, absent when the seat was vacant
        previous: Option<Address>,
        /// New holder, absent after a renounce
        next: Option<Address>,
    },
}
