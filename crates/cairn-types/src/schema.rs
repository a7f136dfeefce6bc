//! Declarative field remapping from source shapes to canonical records
//!
//! Each (source shape, record kind) pair has one static table of
//! [`FieldMapping`]s. [`remap`] walks the table: a field that is absent or
//! `null` in the source becomes `None` (serialized as `null`, never zero); a
//! field that is present but does not decode as its kind fails the whole
//! record.
//!
//! Receipt `logs` are not in the tables; the fuser joins them by transaction
//! hash. Log `removed` is not read from any source.

use crate::block::CanonicalHeader;
use crate::receipt::{CanonicalLog, CanonicalReceipt};
use crate::transaction::CanonicalTransaction;
use cairn_primitives::{Address, HexBytes, Quantity, H256};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Layout family of a stored record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceShape {
    /// snake_case warehouse export rows (live row families)
    Warehouse,
    /// camelCase node RPC objects (archive bundles)
    Rpc,
}

impl fmt::Display for SourceShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceShape::Warehouse => f.write_str("warehouse"),
            SourceShape::Rpc => f.write_str("rpc"),
        }
    }
}

/// Value kind of a mapped field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Unsigned integer (number, decimal string or hex string)
    Quantity,
    /// 32-byte hash
    Hash,
    /// 20-byte address
    Address,
    /// Variable-length hex bytes
    Data,
    /// List of 32-byte hashes
    Topics,
}

/// Remapping failure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RemapError {
    /// Record is not a JSON object
    #[error("{kind} record is not an object")]
    NotAnObject {
        /// Record kind
        kind: &'static str,
    },
    /// A present field failed to decode
    #[error("{kind}.{field}: cannot decode {value} as {expected:?}")]
    InvalidField {
        /// Record kind
        kind: &'static str,
        /// Source field name
        field: &'static str,
        /// Expected kind
        expected: FieldKind,
        /// Offending value, truncated
        value: String,
    },
}

/// Typed writer of one canonical field
pub enum Setter<T> {
    /// Quantity field
    Quantity(fn(&mut T, Option<Quantity>)),
    /// Hash field
    Hash(fn(&mut T, Option<H256>)),
    /// Address field
    Address(fn(&mut T, Option<Address>)),
    /// Byte string field
    Data(fn(&mut T, Option<HexBytes>)),
    /// Topic list field
    Topics(fn(&mut T, Option<Vec<H256>>)),
}

impl<T> Setter<T> {
    /// Kind written by this setter
    pub fn kind(&self) -> FieldKind {
        match self {
            Setter::Quantity(_) => FieldKind::Quantity,
            Setter::Hash(_) => FieldKind::Hash,
            Setter::Address(_) => FieldKind::Address,
            Setter::Data(_) => FieldKind::Data,
            Setter::Topics(_) => FieldKind::Topics,
        }
    }
}

/// One row of a remap table
pub struct FieldMapping<T> {
    /// Field name in the source record
    pub source: &'static str,
    /// Field name in the canonical record
    pub canonical: &'static str,
    /// Writer for the canonical field
    pub setter: Setter<T>,
}

impl<T> FieldMapping<T> {
    /// Value kind of the field
    pub fn kind(&self) -> FieldKind {
        self.setter.kind()
    }
}

/// A canonical record kind with one remap table per source shape
pub trait Remap: Default + Sized + 'static {
    /// Record kind name used in errors
    const KIND: &'static str;

    /// Remap table for `shape`
    fn mappings(shape: SourceShape) -> &'static [FieldMapping<Self>];
}

/// Remap one source record into a canonical record
pub fn remap<T: Remap>(shape: SourceShape, record: &Value) -> Result<T, RemapError> {
    let obj = record
        .as_object()
        .ok_or(RemapError::NotAnObject { kind: T::KIND })?;
    let mut out = T::default();

    for mapping in T::mappings(shape) {
        let raw = obj.get(mapping.source).filter(|v| !v.is_null());
        let invalid = |v: &Value| RemapError::InvalidField {
            kind: T::KIND,
            field: mapping.source,
            expected: mapping.kind(),
            value: truncate(v),
        };

        match &mapping.setter {
            Setter::Quantity(set) => {
                let value = raw.map(|v| decode_quantity(v).ok_or_else(|| invalid(v))).transpose()?;
                set(&mut out, value);
            }
            Setter::Hash(set) => {
                let value = raw
                    .map(|v| v.as_str().and_then(|s| H256::from_hex(s).ok()).ok_or_else(|| invalid(v)))
                    .transpose()?;
                set(&mut out, value);
            }
            Setter::Address(set) => {
                let value = raw
                    .map(|v| v.as_str().and_then(|s| Address::from_hex(s).ok()).ok_or_else(|| invalid(v)))
                    .transpose()?;
                set(&mut out, value);
            }
            Setter::Data(set) => {
                let value = raw
                    .map(|v| v.as_str().and_then(|s| HexBytes::from_hex(s).ok()).ok_or_else(|| invalid(v)))
                    .transpose()?;
                set(&mut out, value);
            }
            Setter::Topics(set) => {
                let value = raw.map(|v| decode_topics(v).ok_or_else(|| invalid(v))).transpose()?;
                set(&mut out, value);
            }
        }
    }
    Ok(out)
}

fn decode_quantity(v: &Value) -> Option<Quantity> {
    Quantity::deserialize(v).ok()
}

fn decode_topics(v: &Value) -> Option<Vec<H256>> {
    v.as_array()?
        .iter()
        .map(|t| t.as_str().and_then(|s| H256::from_hex(s).ok()))
        .collect()
}

fn truncate(v: &Value) -> String {
    const MAX: usize = 80;
    let s = v.to_string();
    if s.len() <= MAX {
        return s;
    }
    let mut end = MAX;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

// ===== Header tables =====

static WAREHOUSE_HEADER: &[FieldMapping<CanonicalHeader>] = &[
    FieldMapping { source: "number", canonical: "number", setter: Setter::Quantity(|r, v| r.number = v) },
    FieldMapping { source: "hash", canonical: "hash", setter: Setter::Hash(|r, v| r.hash = v) },
    FieldMapping { source: "parent_hash", canonical: "parentHash", setter: Setter::Hash(|r, v| r.parent_hash = v) },
    FieldMapping { source: "timestamp", canonical: "timestamp", setter: Setter::Quantity(|r, v| r.timestamp = v) },
    FieldMapping { source: "nonce", canonical: "nonce", setter: Setter::Data(|r, v| r.nonce = v) },
    FieldMapping { source: "sha3_uncles", canonical: "sha3Uncles", setter: Setter::Hash(|r, v| r.sha3_uncles = v) },
    FieldMapping { source: "logs_bloom", canonical: "logsBloom", setter: Setter::Data(|r, v| r.logs_bloom = v) },
    FieldMapping { source: "transactions_root", canonical: "transactionsRoot", setter: Setter::Hash(|r, v| r.transactions_root = v) },
    FieldMapping { source: "state_root", canonical: "stateRoot", setter: Setter::Hash(|r, v| r.state_root = v) },
    FieldMapping { source: "receipts_root", canonical: "receiptsRoot", setter: Setter::Hash(|r, v| r.receipts_root = v) },
    FieldMapping { source: "miner", canonical: "miner", setter: Setter::Address(|r, v| r.miner = v) },
    FieldMapping { source: "difficulty", canonical: "difficulty", setter: Setter::Quantity(|r, v| r.difficulty = v) },
    FieldMapping { source: "total_difficulty", canonical: "totalDifficulty", setter: Setter::Quantity(|r, v| r.total_difficulty = v) },
    FieldMapping { source: "size", canonical: "size", setter: Setter::Quantity(|r, v| r.size = v) },
    FieldMapping { source: "gas_limit", canonical: "gasLimit", setter: Setter::Quantity(|r, v| r.gas_limit = v) },
    FieldMapping { source: "gas_used", canonical: "gasUsed", setter: Setter::Quantity(|r, v| r.gas_used = v) },
    FieldMapping { source: "base_fee_per_gas", canonical: "baseFeePerGas", setter: Setter::Quantity(|r, v| r.base_fee_per_gas = v) },
    FieldMapping { source: "extra_data", canonical: "extraData", setter: Setter::Data(|r, v| r.extra_data = v) },
];

static RPC_HEADER: &[FieldMapping<CanonicalHeader>] = &[
    FieldMapping { source: "number", canonical: "number", setter: Setter::Quantity(|r, v| r.number = v) },
    FieldMapping { source: "hash", canonical: "hash", setter: Setter::Hash(|r, v| r.hash = v) },
    FieldMapping { source: "parentHash", canonical: "parentHash", setter: Setter::Hash(|r, v| r.parent_hash = v) },
    FieldMapping { source: "timestamp", canonical: "timestamp", setter: Setter::Quantity(|r, v| r.timestamp = v) },
    FieldMapping { source: "nonce", canonical: "nonce", setter: Setter::Data(|r, v| r.nonce = v) },
    FieldMapping { source: "sha3Uncles", canonical: "sha3Uncles", setter: Setter::Hash(|r, v| r.sha3_uncles = v) },
    FieldMapping { source: "logsBloom", canonical: "logsBloom", setter: Setter::Data(|r, v| r.logs_bloom = v) },
    FieldMapping { source: "transactionsRoot", canonical: "transactionsRoot", setter: Setter::Hash(|r, v| r.transactions_root = v) },
    FieldMapping { source: "stateRoot", canonical: "stateRoot", setter: Setter::Hash(|r, v| r.state_root = v) },
    FieldMapping { source: "receiptsRoot", canonical: "receiptsRoot", setter: Setter::Hash(|r, v| r.receipts_root = v) },
    FieldMapping { source: "miner", canonical: "miner", setter: Setter::Address(|r, v| r.miner = v) },
    FieldMapping { source: "difficulty", canonical: "difficulty", setter: Setter::Quantity(|r, v| r.difficulty = v) },
    FieldMapping { source: "totalDifficulty", canonical: "totalDifficulty", setter: Setter::Quantity(|r, v| r.total_difficulty = v) },
    FieldMapping { source: "size", canonical: "size", setter: Setter::Quantity(|r, v| r.size = v) },
    FieldMapping { source: "gasLimit", canonical: "gasLimit", setter: Setter::Quantity(|r, v| r.gas_limit = v) },
    FieldMapping { source: "gasUsed", canonical: "gasUsed", setter: Setter::Quantity(|r, v| r.gas_used = v) },
    FieldMapping { source: "baseFeePerGas", canonical: "baseFeePerGas", setter: Setter::Quantity(|r, v| r.base_fee_per_gas = v) },
    FieldMapping { source: "extraData", canonical: "extraData", setter: Setter::Data(|r, v| r.extra_data = v) },
];

impl Remap for CanonicalHeader {
    const KIND: &'static str = "header";

    fn mappings(shape: SourceShape) -> &'static [FieldMapping<Self>] {
        match shape {
            SourceShape::Warehouse => WAREHOUSE_HEADER,
            SourceShape::Rpc => RPC_HEADER,
        }
    }
}

// ===== Transaction tables =====

static WAREHOUSE_TRANSACTION: &[FieldMapping<CanonicalTransaction>] = &[
    FieldMapping { source: "block_hash", canonical: "blockHash", setter: Setter::Hash(|r, v| r.block_hash = v) },
    FieldMapping { source: "block_number", canonical: "blockNumber", setter: Setter::Quantity(|r, v| r.block_number = v) },
    FieldMapping { source: "from_address", canonical: "from", setter: Setter::Address(|r, v| r.from = v) },
    FieldMapping { source: "gas", canonical: "gas", setter: Setter::Quantity(|r, v| r.gas = v) },
    FieldMapping { source: "gas_price", canonical: "gasPrice", setter: Setter::Quantity(|r, v| r.gas_price = v) },
    FieldMapping { source: "max_fee_per_gas", canonical: "maxFeePerGas", setter: Setter::Quantity(|r, v| r.max_fee_per_gas = v) },
    FieldMapping { source: "max_priority_fee_per_gas", canonical: "maxPriorityFeePerGas", setter: Setter::Quantity(|r, v| r.max_priority_fee_per_gas = v) },
    FieldMapping { source: "hash", canonical: "hash", setter: Setter::Hash(|r, v| r.hash = v) },
    FieldMapping { source: "input", canonical: "input", setter: Setter::Data(|r, v| r.input = v) },
    FieldMapping { source: "nonce", canonical: "nonce", setter: Setter::Quantity(|r, v| r.nonce = v) },
    FieldMapping { source: "to_address", canonical: "to", setter: Setter::Address(|r, v| r.to = v) },
    FieldMapping { source: "transaction_index", canonical: "transactionIndex", setter: Setter::Quantity(|r, v| r.transaction_index = v) },
    FieldMapping { source: "value", canonical: "value", setter: Setter::Quantity(|r, v| r.value = v) },
    FieldMapping { source: "transaction_type", canonical: "type", setter: Setter::Quantity(|r, v| r.tx_type = v) },
    FieldMapping { source: "chain_id", canonical: "chainId", setter: Setter::Quantity(|r, v| r.chain_id = v) },
];

static RPC_TRANSACTION: &[FieldMapping<CanonicalTransaction>] = &[
    FieldMapping { source: "blockHash", canonical: "blockHash", setter: Setter::Hash(|r, v| r.block_hash = v) },
    FieldMapping { source: "blockNumber", canonical: "blockNumber", setter: Setter::Quantity(|r, v| r.block_number = v) },
    FieldMapping { source: "from", canonical: "from", setter: Setter::Address(|r, v| r.from = v) },
    FieldMapping { source: "gas", canonical: "gas", setter: Setter::Quantity(|r, v| r.gas = v) },
    FieldMapping { source: "gasPrice", canonical: "gasPrice", setter: Setter::Quantity(|r, v| r.gas_price = v) },
    FieldMapping { source: "maxFeePerGas", canonical: "maxFeePerGas", setter: Setter::Quantity(|r, v| r.max_fee_per_gas = v) },
    FieldMapping { source: "maxPriorityFeePerGas", canonical: "maxPriorityFeePerGas", setter: Setter::Quantity(|r, v| r.max_priority_fee_per_gas = v) },
    FieldMapping { source: "hash", canonical: "hash", setter: Setter::Hash(|r, v| r.hash = v) },
    FieldMapping { source: "input", canonical: "input", setter: Setter::Data(|r, v| r.input = v) },
    FieldMapping { source: "nonce", canonical: "nonce", setter: Setter::Quantity(|r, v| r.nonce = v) },
    FieldMapping { source: "to", canonical: "to", setter: Setter::Address(|r, v| r.to = v) },
    FieldMapping { source: "transactionIndex", canonical: "transactionIndex", setter: Setter::Quantity(|r, v| r.transaction_index = v) },
    FieldMapping { source: "value", canonical: "value", setter: Setter::Quantity(|r, v| r.value = v) },
    FieldMapping { source: "type", canonical: "type", setter: Setter::Quantity(|r, v| r.tx_type = v) },
    FieldMapping { source: "chainId", canonical: "chainId", setter: Setter::Quantity(|r, v| r.chain_id = v) },
];

impl Remap for CanonicalTransaction {
    const KIND: &'static str = "transaction";

    fn mappings(shape: SourceShape) -> &'static [FieldMapping<Self>] {
        match shape {
            SourceShape::Warehouse => WAREHOUSE_TRANSACTION,
            SourceShape::Rpc => RPC_TRANSACTION,
        }
    }
}

// ===== Receipt tables =====

// Warehouse receipts are transaction export rows; the bloom is not exported.
static WAREHOUSE_RECEIPT: &[FieldMapping<CanonicalReceipt>] = &[
    FieldMapping { source: "block_hash", canonical: "blockHash", setter: Setter::Hash(|r, v| r.block_hash = v) },
    FieldMapping { source: "block_number", canonical: "blockNumber", setter: Setter::Quantity(|r, v| r.block_number = v) },
    FieldMapping { source: "receipt_contract_address", canonical: "contractAddress", setter: Setter::Address(|r, v| r.contract_address = v) },
    FieldMapping { source: "receipt_cumulative_gas_used", canonical: "cumulativeGasUsed", setter: Setter::Quantity(|r, v| r.cumulative_gas_used = v) },
    FieldMapping { source: "receipt_effective_gas_price", canonical: "effectiveGasPrice", setter: Setter::Quantity(|r, v| r.effective_gas_price = v) },
    FieldMapping { source: "from_address", canonical: "from", setter: Setter::Address(|r, v| r.from = v) },
    FieldMapping { source: "receipt_gas_used", canonical: "gasUsed", setter: Setter::Quantity(|r, v| r.gas_used = v) },
    FieldMapping { source: "receipt_status", canonical: "status", setter: Setter::Quantity(|r, v| r.status = v) },
    FieldMapping { source: "to_address", canonical: "to", setter: Setter::Address(|r, v| r.to = v) },
    FieldMapping { source: "hash", canonical: "transactionHash", setter: Setter::Hash(|r, v| r.transaction_hash = v) },
    FieldMapping { source: "transaction_index", canonical: "transactionIndex", setter: Setter::Quantity(|r, v| r.transaction_index = v) },
    FieldMapping { source: "transaction_type", canonical: "type", setter: Setter::Quantity(|r, v| r.tx_type = v) },
];

static RPC_RECEIPT: &[FieldMapping<CanonicalReceipt>] = &[
    FieldMapping { source: "blockHash", canonical: "blockHash", setter: Setter::Hash(|r, v| r.block_hash = v) },
    FieldMapping { source: "blockNumber", canonical: "blockNumber", setter: Setter::Quantity(|r, v| r.block_number = v) },
    FieldMapping { source: "contractAddress", canonical: "contractAddress", setter: Setter::Address(|r, v| r.contract_address = v) },
    FieldMapping { source: "cumulativeGasUsed", canonical: "cumulativeGasUsed", setter: Setter::Quantity(|r, v| r.cumulative_gas_used = v) },
    FieldMapping { source: "effectiveGasPrice", canonical: "effectiveGasPrice", setter: Setter::Quantity(|r, v| r.effective_gas_price = v) },
    FieldMapping { source: "from", canonical: "from", setter: Setter::Address(|r, v| r.from = v) },
    FieldMapping { source: "gasUsed", canonical: "gasUsed", setter: Setter::Quantity(|r, v| r.gas_used = v) },
    FieldMapping { source: "logsBloom", canonical: "logsBloom", setter: Setter::Data(|r, v| r.logs_bloom = v) },
    FieldMapping { source: "status", canonical: "status", setter: Setter::Quantity(|r, v| r.status = v) },
    FieldMapping { source: "to", canonical: "to", setter: Setter::Address(|r, v| r.to = v) },
    FieldMapping { source: "transactionHash", canonical: "transactionHash", setter: Setter::Hash(|r, v| r.transaction_hash = v) },
    FieldMapping { source: "transactionIndex", canonical: "transactionIndex", setter: Setter::Quantity(|r, v| r.transaction_index = v) },
    FieldMapping { source: "type", canonical: "type", setter: Setter::Quantity(|r, v| r.tx_type = v) },
];

impl Remap for CanonicalReceipt {
    const KIND: &'static str = "receipt";

    fn mappings(shape: SourceShape) -> &'static [FieldMapping<Self>] {
        match shape {
            SourceShape::Warehouse => WAREHOUSE_RECEIPT,
            SourceShape::Rpc => RPC_RECEIPT,
        }
    }
}

// ===== Log tables =====

static WAREHOUSE_LOG: &[FieldMapping<CanonicalLog>] = &[
    FieldMapping { source: "address", canonical: "address", setter: Setter::Address(|r, v| r.address = v) },
    FieldMapping { source: "topics", canonical: "topics", setter: Setter::Topics(|r, v| r.topics = v) },
    FieldMapping { source: "data", canonical: "data", setter: Setter::Data(|r, v| r.data = v) },
    FieldMapping { source: "block_number", canonical: "blockNumber", setter: Setter::Quantity(|r, v| r.block_number = v) },
    FieldMapping { source: "transaction_hash", canonical: "transactionHash", setter: Setter::Hash(|r, v| r.transaction_hash = v) },
    FieldMapping { source: "transaction_index", canonical: "transactionIndex", setter: Setter::Quantity(|r, v| r.transaction_index = v) },
    FieldMapping { source: "block_hash", canonical: "blockHash", setter: Setter::Hash(|r, v| r.block_hash = v) },
    FieldMapping { source: "log_index", canonical: "logIndex", setter: Setter::Quantity(|r, v| r.log_index = v) },
];

static RPC_LOG: &[FieldMapping<CanonicalLog>] = &[
    FieldMapping { source: "address", canonical: "address", setter: Setter::Address(|r, v| r.address = v) },
    FieldMapping { source: "topics", canonical: "topics", setter: Setter::Topics(|r, v| r.topics = v) },
    FieldMapping { source: "data", canonical: "data", setter: Setter::Data(|r, v| r.data = v) },
    FieldMapping { source: "blockNumber", canonical: "blockNumber", setter: Setter::Quantity(|r, v| r.block_number = v) },
    FieldMapping { source: "transactionHash", canonical: "transactionHash", setter: Setter::Hash(|r, v| r.transaction_hash = v) },
    FieldMapping { source: "transactionIndex", canonical: "transactionIndex", setter: Setter::Quantity(|r, v| r.transaction_index = v) },
    FieldMapping { source: "blockHash", canonical: "blockHash", setter: Setter::Hash(|r, v| r.block_hash = v) },
    FieldMapping { source: "logIndex", canonical: "logIndex", setter: Setter::Quantity(|r, v| r.log_index = v) },
];

impl Remap for CanonicalLog {
    const KIND: &'static str = "log";

    fn mappings(shape: SourceShape) -> &'static [FieldMapping<Self>] {
        match shape {
            SourceShape::Warehouse => WAREHOUSE_LOG,
            SourceShape::Rpc => RPC_LOG,
        }
    }
}
