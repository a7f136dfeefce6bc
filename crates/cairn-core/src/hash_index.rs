//! Hash index resolution
//!
//! The hash index maps a block hash, state root or transaction hash to the
//! block row that holds it. Families are consulted strongest first; the first
//! family that yields a decodable link decides the locator.
//!
//! An `evmtx*` family keys its links by block hash, so more than one column
//! there means the transaction sits in competing blocks. Such a family is
//! skipped like an ambiguous finality tier.

use crate::finality::AmbiguousTier;
use cairn_primitives::Quantity;
use cairn_storage::families::{columns, hashes};
use cairn_storage::Row;
use cairn_types::{HashType, Locator, LookupStatus};
use serde::Deserialize;

/// Payload layout of a hash index family
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkFormat {
    /// `{chainID, bn}` under any column; always a transaction
    EvmTx,
    /// `{chainID, blockNumber}` under `block`, `stateroot` or `tx`
    Feed,
}

/// One hash index family and the status it confers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashTier {
    /// Family name
    pub family: &'static str,
    /// Status of a link found in the family
    pub status: LookupStatus,
    /// Payload layout
    pub format: LinkFormat,
}

/// Hash index tiers, strongest first
pub const HASH_TIERS: [HashTier; 6] = [
    HashTier { family: hashes::EVM_TX, status: LookupStatus::Finalized, format: LinkFormat::EvmTx },
    HashTier { family: hashes::EVM_TX_UNFINALIZED, status: LookupStatus::Unfinalized, format: LinkFormat::EvmTx },
    HashTier { family: hashes::FEED, status: LookupStatus::Finalized, format: LinkFormat::Feed },
    HashTier { family: hashes::FEED_UNFINALIZED, status: LookupStatus::Unfinalized, format: LinkFormat::Feed },
    HashTier { family: hashes::FEED_EVM_UNFINALIZED, status: LookupStatus::Unfinalized, format: LinkFormat::Feed },
    HashTier { family: hashes::FEED_PENDING, status: LookupStatus::Pending, format: LinkFormat::Feed },
];

/// Feed column priority and the hash type each implies
const FEED_COLUMNS: [(&str, HashType); 3] = [
    (columns::BLOCK, HashType::BlockHash),
    (columns::STATE_ROOT, HashType::StateRoot),
    (columns::TX, HashType::TransactionHash),
];

#[derive(Deserialize)]
struct FeedLink {
    #[serde(rename = "chainID")]
    chain_id: Quantity,
    #[serde(rename = "blockNumber")]
    block_number: Quantity,
}

#[derive(Deserialize)]
struct EvmTxLink {
    #[serde(rename = "chainID")]
    chain_id: Quantity,
    bn: Quantity,
}

/// Outcome of resolving a hash
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexReport {
    /// Resolved locator; `NotFound` when no tier decided
    pub locator: Locator,
    /// Families skipped as ambiguous
    pub ambiguous: Vec<AmbiguousTier>,
}

/// Resolve a hash against its index row (`None` when the row is absent)
pub fn resolve_locator(hash: &str, row: Option<&Row>) -> Locator {
    resolve_index(hash, row).locator
}

/// Resolve a hash, also reporting the families skipped as ambiguous
pub fn resolve_index(hash: &str, row: Option<&Row>) -> IndexReport {
    let mut report = IndexReport {
        locator: Locator::not_found(hash),
        ambiguous: Vec::new(),
    };
    let Some(row) = row else {
        return report;
    };

    for tier in HASH_TIERS.iter() {
        if !row.family_exists(tier.family) {
            continue;
        }
        let (hash_type, chain_id, block_number) = match link_of(row, tier) {
            TierLink::Missing => continue,
            TierLink::Ambiguous(candidates) => {
                tracing::error!(
                    row_key = %row.key(),
                    family = tier.family,
                    candidates = ?candidates,
                    "ambiguous hash index tier"
                );
                report.ambiguous.push(AmbiguousTier {
                    family: tier.family,
                    candidates,
                });
                continue;
            }
            TierLink::Found(hash_type, chain_id, block_number) => {
                (hash_type, chain_id, block_number)
            }
        };
        let locator = &mut report.locator;
        locator.hash_type = hash_type;
        locator.status = tier.status;
        locator.chain_id = Some(chain_id);
        locator.block_number = Some(block_number);
        break;
    }
    report
}

enum TierLink {
    Missing,
    Ambiguous(Vec<String>),
    Found(HashType, u64, u64),
}

fn link_of(row: &Row, tier: &HashTier) -> TierLink {
    let found = match tier.format {
        LinkFormat::EvmTx => {
            let columns = row.columns_of(tier.family);
            match columns.as_slice() {
                [] => None,
                [column] => decode::<EvmTxLink>(row, tier.family, column)
                    .and_then(|link| Some((link.chain_id.as_u64()?, link.bn.as_u64()?)))
                    .map(|(chain, bn)| (HashType::TransactionHash, chain, bn)),
                _ => {
                    return TierLink::Ambiguous(
                        columns.iter().map(|c| c.to_lowercase()).collect(),
                    )
                }
            }
        }
        LinkFormat::Feed => feed_link(row, tier),
    };
    match found {
        Some((hash_type, chain_id, block_number)) => {
            TierLink::Found(hash_type, chain_id, block_number)
        }
        None => TierLink::Missing,
    }
}

fn feed_link(row: &Row, tier: &HashTier) -> Option<(HashType, u64, u64)> {
    let (column, hash_type) = FEED_COLUMNS
        .iter()
        .find(|(column, _)| row.latest_cell(tier.family, column).is_some())?;
    let link = decode::<FeedLink>(row, tier.family, column)?;
    Some((*hash_type, link.chain_id.as_u64()?, link.block_number.as_u64()?))
}

fn decode<T: for<'de> Deserialize<'de>>(row: &Row, family: &str, column: &str) -> Option<T> {
    let cell = row.latest_cell(family, column)?;
    match serde_json::from_slice(&cell.value) {
        Ok(link) => Some(link),
        Err(e) => {
            tracing::error!(
                row_key = %row.key(),
                family,
                column,
                error = %e,
                "malformed hash index payload"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_storage::{Cell, RowKey};
    use serde_json::json;

    const HASH: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

    fn row(entries: &[(&str, &str, serde_json::Value)]) -> Row {
        let mut row = Row::new(&RowKey::for_hash(HASH));
        for (family, column, value) in entries {
            row.insert(family, column, Cell::new(value.to_string(), 1));
        }
        row
    }

    #[test]
    fn test_absent_row_not_found() {
        let locator = resolve_locator(HASH, None);
        assert_eq!(locator.status, LookupStatus::NotFound);
        assert_eq!(locator.hash_type, HashType::Unknown);
        assert!(locator.chain_id.is_none());
    }

    #[test]
    fn test_pending_tx() {
        let r = row(&[("feedpending", "tx", json!({"chainID": 1, "blockNumber": 77}))]);
        let locator = resolve_locator(HASH, Some(&r));
        assert_eq!(locator.status, LookupStatus::Pending);
        assert_eq!(locator.hash_type, HashType::TransactionHash);
        assert_eq!(locator.block_number, Some(77));
    }

    #[test]
    fn test_evmtx_beats_feed() {
        let r = row(&[
            ("feed", "block", json!({"chainID": 1, "blockNumber": 5})),
            ("evmtxunfinalized", "0xbb", json!({"chainID": "2", "bn": "0x10"})),
        ]);
        let locator = resolve_locator(HASH, Some(&r));
        assert_eq!(locator.status, LookupStatus::Unfinalized);
        assert_eq!(locator.hash_type, HashType::TransactionHash);
        assert_eq!(locator.chain_id, Some(2));
        assert_eq!(locator.block_number, Some(16));
    }

    #[test]
    fn test_competing_evmtx_blocks_skipped() {
        let r = row(&[
            ("evmtx", "0xbb", json!({"chainID": 1, "bn": 10})),
            ("evmtx", "0xcc", json!({"chainID": 1, "bn": 11})),
            ("feedunfinalized", "tx", json!({"chainID": 1, "blockNumber": 12})),
        ]);
        let report = resolve_index(HASH, Some(&r));
        assert_eq!(report.ambiguous.len(), 1);
        assert_eq!(report.ambiguous[0].family, "evmtx");
        assert_eq!(report.ambiguous[0].candidates, vec!["0xbb".to_string(), "0xcc".to_string()]);
        assert_eq!(report.locator.status, LookupStatus::Unfinalized);
        assert_eq!(report.locator.block_number, Some(12));
    }

    #[test]
    fn test_competing_evmtx_alone_not_found() {
        let r = row(&[
            ("evmtx", "0xbb", json!({"chainID": 1, "bn": 10})),
            ("evmtx", "0xcc", json!({"chainID": 1, "bn": 10})),
        ]);
        let report = resolve_index(HASH, Some(&r));
        assert!(!report.locator.is_found());
        assert_eq!(report.ambiguous.len(), 1);
    }

    #[test]
    fn test_column_priority() {
        let r = row(&[
            ("feedunfinalized", "tx", json!({"chainID": 1, "blockNumber": 9})),
            ("feedunfinalized", "stateroot", json!({"chainID": 1, "blockNumber": 8})),
        ]);
        let locator = resolve_locator(HASH, Some(&r));
        assert_eq!(locator.hash_type, HashType::StateRoot);
        assert_eq!(locator.block_number, Some(8));

        let r = row(&[
            ("feed", "stateroot", json!({"chainID": 1, "blockNumber": 8})),
            ("feed", "block", json!({"chainID": 1, "blockNumber": 8})),
        ]);
        assert_eq!(resolve_locator(HASH, Some(&r)).hash_type, HashType::BlockHash);
    }

    #[test]
    fn test_malformed_tier_skipped() {
        let r = row(&[
            ("feed", "block", json!({"chainID": 1})),
            ("feedpending", "block", json!({"chainID": 1, "blockNumber": 3})),
        ]);
        let locator = resolve_locator(HASH, Some(&r));
        assert_eq!(locator.status, LookupStatus::Pending);
        assert_eq!(locator.hash_type, HashType::BlockHash);
    }

    #[test]
    fn test_block_zero_is_found() {
        let r = row(&[("feed", "block", json!({"chainID": 1, "blockNumber": 0}))]);
        let locator = resolve_locator(HASH, Some(&r));
        assert_eq!(locator.status, LookupStatus::Finalized);
        assert_eq!(locator.block_number, Some(0));
    }

    #[test]
    fn test_unknown_columns_only() {
        let r = row(&[("feed", "other", json!({"chainID": 1, "blockNumber": 3}))]);
        assert!(!resolve_locator(HASH, Some(&r)).is_found());
    }
}
