//! Block, transaction and trace fusion
//!
//! Fusion is all-or-nothing: a bundle either yields a fully consistent block,
//! with one receipt per transaction and one trace per transaction when traces
//! exist, or an error.

use crate::bundle::RawBundle;
use crate::error::FuseError;
use crate::trace::flatten_block;
use cairn_primitives::{ChainId, H256};
use cairn_types::{
    remap, CanonicalBlock, CanonicalHeader, CanonicalLog, CanonicalReceipt, CanonicalTransaction,
    FusedTransaction, SourceShape,
};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Fuse a whole block
pub fn fuse_block(chain_id: ChainId, bundle: &RawBundle) -> Result<CanonicalBlock, FuseError> {
    let header: CanonicalHeader = remap(bundle.shape, &bundle.header)?;

    if !bundle.transactions.is_empty() && bundle.receipts.is_none() {
        return Err(FuseError::Invalid(format!(
            "{} transactions without receipts",
            bundle.transactions.len()
        )));
    }
    let raw_receipts = bundle.receipts.as_deref().unwrap_or(&[]);

    let (transactions, receipts) = rayon::join(
        || normalize_transactions(bundle.shape, &bundle.transactions),
        || normalize_receipts(bundle.shape, raw_receipts, &bundle.logs),
    );
    let transactions = transactions?;
    let receipts = receipts?;

    check_receipts(&transactions, &receipts)?;

    let traces = bundle
        .traces
        .as_deref()
        .map(|items| flatten_block(items, &transactions))
        .transpose()?;

    Ok(CanonicalBlock {
        chain_id,
        header,
        status: bundle.status,
        transactions,
        receipts,
        traces,
        token_transfers: bundle.token_transfers.clone(),
        contracts: bundle.contracts.clone(),
    })
}

/// Fuse a block and cut out one transaction with its receipt and traces
pub fn fuse_transaction(
    chain_id: ChainId,
    bundle: &RawBundle,
    tx_hash: &H256,
) -> Result<FusedTransaction, FuseError> {
    let block = fuse_block(chain_id, bundle)?;
    transaction_at(block, tx_hash)
}

/// Slice the transaction with `tx_hash` out of a fused block
pub fn transaction_at(block: CanonicalBlock, tx_hash: &H256) -> Result<FusedTransaction, FuseError> {
    let position = block
        .transactions
        .iter()
        .position(|tx| tx.hash.as_ref() == Some(tx_hash))
        .ok_or_else(|| FuseError::NotFound(format!("transaction {} not in block", tx_hash)))?;

    let block_number = block
        .number()
        .ok_or_else(|| FuseError::Invalid("header has no number".to_string()))?;
    let block_hash = *block
        .hash()
        .ok_or_else(|| FuseError::Invalid("header has no hash".to_string()))?;
    let timestamp = block.timestamp();

    let CanonicalBlock {
        chain_id,
        status,
        mut transactions,
        mut receipts,
        traces,
        ..
    } = block;

    check_receipts(&transactions, &receipts)?;

    let traces = traces
        .unwrap_or_default()
        .into_iter()
        .filter(|entry| entry.transaction_index == position as u64)
        .collect();

    Ok(FusedTransaction {
        chain_id,
        block_number,
        block_hash,
        timestamp,
        status,
        transaction: transactions.swap_remove(position),
        receipt: receipts.swap_remove(position),
        traces,
    })
}

/// Remap, validate and index-sort transactions
fn normalize_transactions(
    shape: SourceShape,
    raw: &[Value],
) -> Result<Vec<CanonicalTransaction>, FuseError> {
    let mut txs = raw
        .iter()
        .map(|record| remap::<CanonicalTransaction>(shape, record))
        .collect::<Result<Vec<_>, _>>()?;

    for tx in &txs {
        if tx.hash.is_none() {
            return Err(FuseError::Invalid("transaction without hash".to_string()));
        }
        if tx.index().is_none() {
            return Err(FuseError::Invalid(format!(
                "transaction {} without index",
                display_hash(tx.hash.as_ref())
            )));
        }
        if tx.known_type().is_none() {
            return Err(FuseError::Invalid(format!(
                "transaction {} has unknown type {}",
                display_hash(tx.hash.as_ref()),
                tx.tx_type.map_or_else(|| "null".to_string(), |t| t.to_string())
            )));
        }
    }

    txs.sort_by_key(|tx| tx.index());
    check_positions(txs.iter().map(CanonicalTransaction::index), "transaction")?;
    Ok(txs)
}

/// Remap logs and receipts, then attach each receipt's logs
fn normalize_receipts(
    shape: SourceShape,
    raw_receipts: &[Value],
    raw_logs: &[Value],
) -> Result<Vec<CanonicalReceipt>, FuseError> {
    let mut logs = raw_logs
        .iter()
        .map(|record| remap::<CanonicalLog>(shape, record))
        .collect::<Result<Vec<_>, _>>()?;
    logs.sort_by_key(|log| log.index());

    let mut logs_by_tx: HashMap<H256, Vec<CanonicalLog>> = HashMap::new();
    for log in logs {
        let tx_hash = log
            .transaction_hash
            .ok_or_else(|| FuseError::Invalid("log without transaction hash".to_string()))?;
        logs_by_tx.entry(tx_hash).or_default().push(log);
    }

    let mut receipts = raw_receipts
        .iter()
        .map(|record| remap::<CanonicalReceipt>(shape, record))
        .collect::<Result<Vec<_>, _>>()?;
    receipts.sort_by_key(|r| r.index());
    check_positions(receipts.iter().map(CanonicalReceipt::index), "receipt")?;

    for receipt in &mut receipts {
        let tx_hash = receipt
            .transaction_hash
            .ok_or_else(|| FuseError::Invalid("receipt without transaction hash".to_string()))?;
        receipt.logs = logs_by_tx.remove(&tx_hash).unwrap_or_default();
    }

    if !logs_by_tx.is_empty() {
        tracing::debug!(orphans = logs_by_tx.len(), "logs without a matching receipt dropped");
    }
    Ok(receipts)
}

/// Indices must be exactly `0..n` after sorting
fn check_positions(
    indices: impl Iterator<Item = Option<u64>>,
    what: &str,
) -> Result<(), FuseError> {
    let mut seen = HashSet::new();
    for (position, index) in indices.enumerate() {
        let index = index.ok_or_else(|| FuseError::Invalid(format!("{} without index", what)))?;
        if !seen.insert(index) {
            return Err(FuseError::Invalid(format!("duplicate {} index {}", what, index)));
        }
        if index != position as u64 {
            return Err(FuseError::Invalid(format!(
                "{} index {} at position {}",
                what, index, position
            )));
        }
    }
    Ok(())
}

fn check_receipts(
    transactions: &[CanonicalTransaction],
    receipts: &[CanonicalReceipt],
) -> Result<(), FuseError> {
    if receipts.len() != transactions.len() {
        return Err(FuseError::Invalid(format!(
            "{} receipts for {} transactions",
            receipts.len(),
            transactions.len()
        )));
    }
    for (position, (tx, receipt)) in transactions.iter().zip(receipts).enumerate() {
        if tx.hash != receipt.transaction_hash {
            return Err(FuseError::Invalid(format!(
                "receipt {} is for {}, transaction is {}",
                position,
                display_hash(receipt.transaction_hash.as_ref()),
                display_hash(tx.hash.as_ref())
            )));
        }
    }
    Ok(())
}

fn display_hash(hash: Option<&H256>) -> String {
    hash.map_or_else(|| "null".to_string(), H256::to_hex)
}
