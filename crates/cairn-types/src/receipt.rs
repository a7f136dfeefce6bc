//! Canonical receipt and log records

use cairn_primitives::{Address, HexBytes, Quantity, H256};
use serde::{Deserialize, Serialize};

/// Log entry emitted during transaction execution
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalLog {
    /// Emitting contract
    pub address: Option<Address>,
    /// Indexed topics
    pub topics: Option<Vec<H256>>,
    /// Non-indexed data
    pub data: Option<HexBytes>,
    /// Number of the containing block
    pub block_number: Option<Quantity>,
    /// Hash of the emitting transaction
    pub transaction_hash: Option<H256>,
    /// Position of the emitting transaction
    pub transaction_index: Option<Quantity>,
    /// Hash of the containing block
    pub block_hash: Option<H256>,
    /// Position of the log in the block
    pub log_index: Option<Quantity>,
    /// Always `false`: reorged data never reaches a fused record, so the
    /// flag is synthesized rather than read
    pub removed: bool,
}

impl CanonicalLog {
    /// Position in the block as an integer
    pub fn index(&self) -> Option<u64> {
        self.log_index.as_ref()?.as_u64()
    }
}

/// Transaction receipt with its logs joined in
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalReceipt {
    /// Hash of the containing block
    pub block_hash: Option<H256>,
    /// Number of the containing block
    pub block_number: Option<Quantity>,
    /// Created contract, if any
    pub contract_address: Option<Address>,
    /// Gas used in the block up to and including this transaction
    pub cumulative_gas_used: Option<Quantity>,
    /// Price actually paid per gas
    pub effective_gas_price: Option<Quantity>,
    /// Sender
    pub from: Option<Address>,
    /// Gas used by this transaction
    pub gas_used: Option<Quantity>,
    /// Logs in log-index order
    pub logs: Vec<CanonicalLog>,
    /// Bloom filter; null when the source did not carry one
    pub logs_bloom: Option<HexBytes>,
    /// 1 success, 0 failure
    pub status: Option<Quantity>,
    /// Recipient
    pub to: Option<Address>,
    /// Transaction hash
    pub transaction_hash: Option<H256>,
    /// Position of the transaction
    pub transaction_index: Option<Quantity>,
    /// Envelope type
    #[serde(rename = "type")]
    pub tx_type: Option<Quantity>,
}

impl CanonicalReceipt {
    /// Position in the block as an integer
    pub fn index(&self) -> Option<u64> {
        self.transaction_index.as_ref()?.as_u64()
    }
}
