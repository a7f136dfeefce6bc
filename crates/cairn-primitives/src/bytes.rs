//! Variable-length hex byte strings (input data, log data, blooms)

use bytes::Bytes;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Byte string parsing error
#[derive(Debug, Error)]
pub enum BytesError {
    /// Invalid hex string
    #[error("invalid hex bytes: {0}")]
    InvalidHex(String),
}

/// Hex-encoded byte string
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct HexBytes(Bytes);

impl HexBytes {
    /// Parse from hex string; `0x` and the empty string are both the empty byte string
    pub fn from_hex(s: &str) -> Result<Self, BytesError> {
        let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        hex::decode(s)
            .map(|b| HexBytes(Bytes::from(b)))
            .map_err(|e| BytesError::InvalidHex(e.to_string()))
    }

    /// Get as byte slice
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert to lowercase hex string with 0x prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl fmt::Debug for HexBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HexBytes({})", self.to_hex())
    }
}

impl From<Vec<u8>> for HexBytes {
    fn from(bytes: Vec<u8>) -> Self {
        HexBytes(Bytes::from(bytes))
    }
}

impl From<Bytes> for HexBytes {
    fn from(bytes: Bytes) -> Self {
        HexBytes(bytes)
    }
}

impl Serialize for HexBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        HexBytes::from_hex(&s).map_err(de::Error::custom)
    }
}
