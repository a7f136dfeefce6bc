//! Row-key encoding
//!
//! Block rows are keyed by `0x` followed by the block number as eight
//! zero-padded lowercase hex digits, so lexical order equals numeric order.
//! Hash-index rows are keyed by the lowercase hash string itself.

use crate::error::{StorageError, StorageResult};
use std::fmt;

/// Width of the hex block-number key, excluding the `0x` prefix
const BLOCK_KEY_DIGITS: usize = 8;

/// Table a row lives in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    /// Per-chain block table
    Chain(u64),
    /// Global hash index
    Hashes,
}

impl Table {
    /// Physical table name
    pub fn name(&self) -> String {
        match self {
            Table::Chain(chain_id) => format!("chain{}", chain_id),
            Table::Hashes => "hashes".to_string(),
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Encoded row key
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey(String);

impl RowKey {
    /// Key of the block row for `block_number`
    pub fn for_block(block_number: u64) -> StorageResult<Self> {
        if block_number > u64::from(u32::MAX) {
            return Err(StorageError::InvalidKey(format!(
                "block number {} exceeds key width",
                block_number
            )));
        }
        Ok(RowKey(format!(
            "0x{:0width$x}",
            block_number,
            width = BLOCK_KEY_DIGITS
        )))
    }

    /// Key of the hash-index row for `hash`
    pub fn for_hash(hash: &str) -> Self {
        RowKey(hash.trim().to_lowercase())
    }

    /// Decode the block number of a block row key
    pub fn block_number(&self) -> Option<u64> {
        let digits = self.0.strip_prefix("0x")?;
        if digits.len() != BLOCK_KEY_DIGITS {
            return None;
        }
        u64::from_str_radix(digits, 16).ok()
    }

    /// Key as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
