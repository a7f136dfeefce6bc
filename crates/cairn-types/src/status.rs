//! Finality status and hash lookup results

use cairn_primitives::{BlockNumber, ChainId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Finality of a reconstructed block.
///
/// Ordered by strength: `Pending < Unfinalized < Finalized`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockStatus {
    /// Seen by a feed, not yet in a produced block
    Pending,
    /// Produced but not final
    Unfinalized,
    /// Final
    Finalized,
}

impl fmt::Display for BlockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BlockStatus::Pending => "pending",
            BlockStatus::Unfinalized => "unfinalized",
            BlockStatus::Finalized => "finalized",
        };
        f.write_str(s)
    }
}

/// Status reported by a hash lookup
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LookupStatus {
    /// Hash unknown to the index
    NotFound,
    /// Pending
    Pending,
    /// Unfinalized
    Unfinalized,
    /// Finalized
    Finalized,
}

impl From<BlockStatus> for LookupStatus {
    fn from(status: BlockStatus) -> Self {
        match status {
            BlockStatus::Pending => LookupStatus::Pending,
            BlockStatus::Unfinalized => LookupStatus::Unfinalized,
            BlockStatus::Finalized => LookupStatus::Finalized,
        }
    }
}

/// What a looked-up hash identifies
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HashType {
    /// Block hash
    BlockHash,
    /// Transaction hash
    TransactionHash,
    /// State root
    StateRoot,
    /// Not identified
    Unknown,
}

/// Where a hash points
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locator {
    /// Looked-up hash, lowercased
    pub hash: String,
    /// Kind of object the hash identifies
    pub hash_type: HashType,
    /// Finality of the referenced block
    pub status: LookupStatus,
    /// Chain of the referenced block
    #[serde(rename = "chainID")]
    pub chain_id: Option<ChainId>,
    /// Number of the referenced block
    pub block_number: Option<BlockNumber>,
}

impl Locator {
    /// Locator for a hash the index does not know
    pub fn not_found(hash: &str) -> Self {
        Self {
            hash: hash.to_lowercase(),
            hash_type: HashType::Unknown,
            status: LookupStatus::NotFound,
            chain_id: None,
            block_number: None,
        }
    }

    /// Check whether the lookup matched
    pub fn is_found(&self) -> bool {
        self.status != LookupStatus::NotFound
    }
}
