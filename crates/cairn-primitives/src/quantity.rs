//! Unsigned integer quantities (block numbers, gas, wei values, indices)
//!
//! Stored payloads spell quantities three ways: JSON numbers, decimal strings
//! (warehouse exports of 256-bit values) and `0x` hex strings (node RPC). All
//! three decode to the same [`Quantity`]; output is always `0x` hex.
//!
//! A bare JSON number must fit in a `u64`. The JSON parser hands larger
//! numbers over as `f64` with the low digits already lost, so they are
//! rejected rather than silently rounded. Values above `u64::MAX` have to be
//! spelled as decimal or hex strings.

use primitive_types::U256;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Quantity parsing error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantityError {
    /// Empty string
    #[error("empty quantity")]
    Empty,
    /// Invalid hex digits
    #[error("invalid hex quantity: {0}")]
    InvalidHex(String),
    /// Invalid decimal digits
    #[error("invalid decimal quantity: {0}")]
    InvalidDecimal(String),
    /// Negative or fractional number
    #[error("not an unsigned integer: {0}")]
    NotUnsigned(String),
}

/// Largest integer an f64 holds exactly
const MAX_SAFE_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Unsigned 256-bit quantity
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Quantity(U256);

impl Quantity {
    /// Zero
    pub const ZERO: Quantity = Quantity(U256::zero());

    /// Wrap a U256
    pub const fn new(value: U256) -> Self {
        Quantity(value)
    }

    /// Parse `0x`-prefixed hex or plain decimal
    pub fn parse(s: &str) -> Result<Self, QuantityError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(QuantityError::Empty);
        }
        if let Some(digits) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            if digits.is_empty() {
                return Err(QuantityError::InvalidHex(s.to_string()));
            }
            return U256::from_str_radix(digits, 16)
                .map(Quantity)
                .map_err(|_| QuantityError::InvalidHex(s.to_string()));
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(QuantityError::InvalidDecimal(s.to_string()));
        }
        U256::from_dec_str(s)
            .map(Quantity)
            .map_err(|_| QuantityError::InvalidDecimal(s.to_string()))
    }

    /// Underlying value
    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// Value as u64 if it fits
    pub fn as_u64(&self) -> Option<u64> {
        if self.0 > U256::from(u64::MAX) {
            None
        } else {
            Some(self.0.low_u64())
        }
    }

    /// Convert to `0x` hex string without leading zeros
    pub fn to_hex(&self) -> String {
        format!("0x{:x}", self.0)
    }
}

impl fmt::Debug for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Quantity({})", self.to_hex())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Quantity(U256::from(value))
    }
}

impl From<U256> for Quantity {
    fn from(value: U256) -> Self {
        Quantity(value)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

struct QuantityVisitor;

impl<'de> de::Visitor<'de> for QuantityVisitor {
    type Value = Quantity;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an unsigned integer, a decimal string or a 0x hex string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Quantity, E> {
        Ok(Quantity::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Quantity, E> {
        u64::try_from(v)
            .map(Quantity::from)
            .map_err(|_| E::custom(QuantityError::NotUnsigned(v.to_string())))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Quantity, E> {
        if v >= 0.0 && v.fract() == 0.0 && v <= MAX_SAFE_FLOAT {
            Ok(Quantity::from(v as u64))
        } else {
            Err(E::custom(QuantityError::NotUnsigned(v.to_string())))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Quantity, E> {
        Quantity::parse(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(QuantityVisitor)
    }
}
