//! Raw payload bundles
//!
//! A bundle is every payload needed to fuse one block, decoded from JSON but
//! not yet remapped. Live rows yield warehouse-shaped bundles; archive files
//! yield RPC-shaped ones.

use crate::error::FuseError;
use crate::finality::Resolution;
use cairn_storage::families::block;
use cairn_storage::Row;
use cairn_types::{BlockStatus, SourceShape, TraceItem};
use serde::Deserialize;
use serde_json::Value;

/// Undecoded-but-parsed payloads of one block
#[derive(Clone, Debug, PartialEq)]
pub struct RawBundle {
    /// Shape of every record in the bundle
    pub shape: SourceShape,
    /// Block hash the payloads were read under
    pub block_hash: String,
    /// Finality of the block
    pub status: BlockStatus,
    /// Header record
    pub header: Value,
    /// Transaction records
    pub transactions: Vec<Value>,
    /// Receipt records; `None` when no receipt payload exists
    pub receipts: Option<Vec<Value>>,
    /// Log records across the block
    pub logs: Vec<Value>,
    /// Per-transaction traces; `None` when no trace payload exists
    pub traces: Option<Vec<TraceItem>>,
    /// Token transfer payload
    pub token_transfers: Option<Vec<Value>>,
    /// Created contract payload
    pub contracts: Option<Vec<Value>>,
}

impl RawBundle {
    /// Collect the payloads stored under the resolved hash of a live row
    pub fn from_row(row: &Row, resolution: &Resolution) -> Result<Self, FuseError> {
        let hash = resolution.block_hash.as_str();

        let mut header: Value = match cell_json(row, block::BLOCK, hash)? {
            Some(header) => header,
            None => {
                return Err(FuseError::NotAvailable(format!(
                    "no {} payload for {}",
                    block::BLOCK,
                    hash
                )))
            }
        };
        if !header.is_object() {
            return Err(FuseError::Invalid(format!("{} payload is not an object", block::BLOCK)));
        }

        let embedded = header
            .as_object_mut()
            .and_then(|obj| obj.remove("transactions"));
        let transactions = match cell_json::<Vec<Value>>(row, block::TRANSACTIONS, hash)? {
            Some(txs) => txs,
            None => embedded_transactions(embedded)?,
        };

        Ok(Self {
            shape: SourceShape::Warehouse,
            block_hash: hash.to_string(),
            status: resolution.status,
            header,
            transactions,
            receipts: cell_json(row, block::RECEIPTS, hash)?,
            logs: cell_json(row, block::LOGS, hash)?.unwrap_or_default(),
            traces: cell_json(row, block::TRACES, hash)?,
            token_transfers: cell_json(row, block::TOKEN_TRANSFERS, hash)?,
            contracts: cell_json(row, block::CONTRACTS, hash)?,
        })
    }

    /// Decode an archived `{block, receipts, traces}` bundle.
    ///
    /// Archived blocks are final. Logs are lifted out of the receipts so the
    /// fuser joins them the same way for both shapes.
    pub fn from_archive(data: &[u8]) -> Result<Self, FuseError> {
        #[derive(Deserialize)]
        struct Archived {
            block: Value,
            #[serde(default)]
            receipts: Option<Vec<Value>>,
            #[serde(default)]
            traces: Option<Vec<TraceItem>>,
        }

        let archived: Archived = serde_json::from_slice(data)
            .map_err(|e| FuseError::Invalid(format!("archive bundle: {}", e)))?;
        let mut header = archived.block;
        let obj = header
            .as_object_mut()
            .ok_or_else(|| FuseError::Invalid("archived block is not an object".to_string()))?;
        let block_hash = obj
            .get("hash")
            .and_then(Value::as_str)
            .map(str::to_lowercase)
            .ok_or_else(|| FuseError::Invalid("archived block has no hash".to_string()))?;
        let transactions = embedded_transactions(obj.remove("transactions"))?;

        let mut receipts = archived.receipts;
        let mut logs = Vec::new();
        for receipt in receipts.iter_mut().flatten() {
            if let Some(Value::Array(receipt_logs)) =
                receipt.as_object_mut().and_then(|r| r.remove("logs"))
            {
                logs.extend(receipt_logs);
            }
        }

        Ok(Self {
            shape: SourceShape::Rpc,
            block_hash,
            status: BlockStatus::Finalized,
            header,
            transactions,
            receipts,
            logs,
            traces: archived.traces,
            token_transfers: None,
            contracts: None,
        })
    }
}

/// Decode the latest cell of `family`/`column` as JSON
fn cell_json<T: serde::de::DeserializeOwned>(
    row: &Row,
    family: &'static str,
    column: &str,
) -> Result<Option<T>, FuseError> {
    let Some(cell) = row.latest_cell(family, column) else {
        return Ok(None);
    };
    serde_json::from_slice(&cell.value).map(Some).map_err(|e| {
        FuseError::Invalid(format!("{} cell {}: {}", family, column, e))
    })
}

/// Transactions embedded in a header must be full objects, not hashes
fn embedded_transactions(embedded: Option<Value>) -> Result<Vec<Value>, FuseError> {
    match embedded {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(txs)) => {
            if txs.iter().all(Value::is_object) {
                Ok(txs)
            } else {
                Err(FuseError::Invalid(
                    "embedded transactions are not full objects".to_string(),
                ))
            }
        }
        Some(_) => Err(FuseError::Invalid("embedded transactions are not a list".to_string())),
    }
}
