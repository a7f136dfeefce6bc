//! Column family and column names
//!
//! Block rows and hash-index rows use different family sets. Several names
//! double as finality tiers; the tier order itself lives with the resolvers.

/// Families found in per-chain block rows
pub mod block {
    /// Finality marker; its column is the finalized block hash
    pub const FINALIZED: &str = "finalized";
    /// Raw block header payload per block hash
    pub const BLOCK: &str = "blockrawevm";
    /// Per-transaction call traces per block hash
    pub const TRACES: &str = "traceevm";
    /// Pending block marker per block hash
    pub const PENDING: &str = "feedpending";
    /// Receipt list per block hash
    pub const RECEIPTS: &str = "receiptsevm";
    /// Log list per block hash
    pub const LOGS: &str = "logs";
    /// Transaction list per block hash
    pub const TRANSACTIONS: &str = "transactions";
    /// Token transfer list per block hash
    pub const TOKEN_TRANSFERS: &str = "token_transfers";
    /// Created contract list per block hash
    pub const CONTRACTS: &str = "contracts";
}

/// Families found in hash-index rows
pub mod hashes {
    /// Finalized transaction links
    pub const EVM_TX: &str = "evmtx";
    /// Unfinalized transaction links
    pub const EVM_TX_UNFINALIZED: &str = "evmtxunfinalized";
    /// Finalized feed entries
    pub const FEED: &str = "feed";
    /// Unfinalized feed entries
    pub const FEED_UNFINALIZED: &str = "feedunfinalized";
    /// Unfinalized feed entries written by the EVM indexer
    pub const FEED_EVM_UNFINALIZED: &str = "feedevmunfinalized";
    /// Pending feed entries
    pub const FEED_PENDING: &str = "feedpending";
}

/// Columns inside hash-index feed families
pub mod columns {
    /// Entry describes a block
    pub const BLOCK: &str = "block";
    /// Entry describes a state root
    pub const STATE_ROOT: &str = "stateroot";
    /// Entry describes a transaction
    pub const TX: &str = "tx";
}

/// Every family a block row may carry
pub const BLOCK_ROW_FAMILIES: &[&str] = &[
    block::FINALIZED,
    block::BLOCK,
    block::TRACES,
    block::PENDING,
    block::RECEIPTS,
    block::LOGS,
    block::TRANSACTIONS,
    block::TOKEN_TRANSFERS,
    block::CONTRACTS,
];

/// Every family a hash-index row may carry
pub const HASH_INDEX_FAMILIES: &[&str] = &[
    hashes::EVM_TX,
    hashes::EVM_TX_UNFINALIZED,
    hashes::FEED,
    hashes::FEED_UNFINALIZED,
    hashes::FEED_EVM_UNFINALIZED,
    hashes::FEED_PENDING,
];

/// All distinct family names across both row kinds
pub fn all_families() -> Vec<&'static str> {
    let mut all: Vec<&'static str> = BLOCK_ROW_FAMILIES
        .iter()
        .chain(HASH_INDEX_FAMILIES.iter())
        .copied()
        .collect();
    all.sort_unstable();
    all.dedup();
    all
}

/// Restricts a row fetch to a set of families and a number of versions per column
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FamilyFilter {
    families: Vec<String>,
    cell_limit: usize,
}

impl FamilyFilter {
    /// Filter for the given families, latest version only
    pub fn new<I, S>(families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            families: families.into_iter().map(Into::into).collect(),
            cell_limit: 1,
        }
    }

    /// Filter for every block-row family
    pub fn block_row() -> Self {
        Self::new(BLOCK_ROW_FAMILIES.iter().copied())
    }

    /// Filter for every hash-index family
    pub fn hash_index() -> Self {
        Self::new(HASH_INDEX_FAMILIES.iter().copied())
    }

    /// Keep up to `limit` versions per column (at least one)
    pub fn with_cell_limit(mut self, limit: usize) -> Self {
        self.cell_limit = limit.max(1);
        self
    }

    /// Families to fetch
    pub fn families(&self) -> &[String] {
        &self.families
    }

    /// Versions kept per column
    pub fn cell_limit(&self) -> usize {
        self.cell_limit
    }

    /// Check whether a family passes the filter
    pub fn includes(&self, family: &str) -> bool {
        self.families.iter().any(|f| f == family)
    }
}
