//! Canonical block header and fused records

use crate::receipt::CanonicalReceipt;
use crate::status::BlockStatus;
use crate::trace::TraceEntry;
use crate::transaction::CanonicalTransaction;
use cairn_primitives::{Address, ChainId, HexBytes, Quantity, H256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Block header in canonical field names
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalHeader {
    /// Block number
    pub number: Option<Quantity>,
    /// Block hash
    pub hash: Option<H256>,
    /// Parent block hash
    pub parent_hash: Option<H256>,
    /// Unix timestamp in seconds
    pub timestamp: Option<Quantity>,
    /// PoW nonce
    pub nonce: Option<HexBytes>,
    /// Ommers hash
    pub sha3_uncles: Option<H256>,
    /// Logs bloom
    pub logs_bloom: Option<HexBytes>,
    /// Transactions trie root
    pub transactions_root: Option<H256>,
    /// State trie root
    pub state_root: Option<H256>,
    /// Receipts trie root
    pub receipts_root: Option<H256>,
    /// Block producer
    pub miner: Option<Address>,
    /// Difficulty
    pub difficulty: Option<Quantity>,
    /// Total difficulty up to this block
    pub total_difficulty: Option<Quantity>,
    /// Encoded size in bytes
    pub size: Option<Quantity>,
    /// Gas limit
    pub gas_limit: Option<Quantity>,
    /// Gas used
    pub gas_used: Option<Quantity>,
    /// EIP-1559 base fee
    pub base_fee_per_gas: Option<Quantity>,
    /// Extra data
    pub extra_data: Option<HexBytes>,
}

/// Fully reconstructed block
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalBlock {
    /// Chain the block belongs to
    #[serde(rename = "chainID")]
    pub chain_id: ChainId,
    /// Header fields, flattened into the block object
    #[serde(flatten)]
    pub header: CanonicalHeader,
    /// Finality of the resolved hash
    pub status: BlockStatus,
    /// Transactions in index order
    pub transactions: Vec<CanonicalTransaction>,
    /// Receipts, one per transaction, same order
    pub receipts: Vec<CanonicalReceipt>,
    /// Flattened traces; absent when no trace payload exists
    pub traces: Option<Vec<TraceEntry>>,
    /// Token transfer payload, passed through
    pub token_transfers: Option<Vec<Value>>,
    /// Created contract payload, passed through
    pub contracts: Option<Vec<Value>>,
}

impl CanonicalBlock {
    /// Block number as an integer
    pub fn number(&self) -> Option<u64> {
        self.header.number.as_ref()?.as_u64()
    }

    /// Block hash
    pub fn hash(&self) -> Option<&H256> {
        self.header.hash.as_ref()
    }

    /// Timestamp in seconds
    pub fn timestamp(&self) -> Option<u64> {
        self.header.timestamp.as_ref()?.as_u64()
    }

    /// Parent hash
    pub fn parent_hash(&self) -> Option<&H256> {
        self.header.parent_hash.as_ref()
    }

    /// Number of transactions
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}

/// One transaction cut out of a fused block
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FusedTransaction {
    /// Chain the block belongs to
    #[serde(rename = "chainID")]
    pub chain_id: ChainId,
    /// Containing block number
    pub block_number: u64,
    /// Containing block hash
    pub block_hash: H256,
    /// Block timestamp in seconds
    pub timestamp: Option<u64>,
    /// Finality of the containing block
    pub status: BlockStatus,
    /// Transaction
    pub transaction: CanonicalTransaction,
    /// Receipt with logs
    pub receipt: CanonicalReceipt,
    /// Flattened call frames of this transaction
    pub traces: Vec<TraceEntry>,
}
