//! Block reader service
//!
//! Each request performs at most one block-row fetch (plus one hash-index
//! fetch for lookups by hash, and one archive read when the live row is
//! absent). Everything after the fetch runs on the in-memory snapshot.
//!
//! The request timeout is one deadline per public call, shared by every store
//! call that request makes.

use crate::bundle::RawBundle;
use crate::config::ReaderConfig;
use crate::error::{FetchError, FetchResult, FuseError};
use crate::finality::resolve_block;
use crate::fuser::{fuse_block, transaction_at};
use crate::hash_index::resolve_index;
use cairn_metrics::{timed, ReadEvent, ReaderMetrics};
use cairn_primitives::{BlockNumber, ChainId, H256};
use cairn_storage::{ArchiveStore, FamilyFilter, Row, RowKey, RowStore, StorageResult, Table};
use cairn_types::{CanonicalBlock, FusedTransaction, HashType, Locator};
use std::future::Future;
use std::sync::Arc;
use tokio::time::Instant;

/// Reconstructs canonical blocks and transactions from a row store
pub struct BlockReader<S, A> {
    store: S,
    archive: A,
    config: ReaderConfig,
    metrics: Arc<ReaderMetrics>,
}

impl<S: RowStore, A: ArchiveStore> BlockReader<S, A> {
    /// Create a reader with its own metrics
    pub fn new(store: S, archive: A, config: ReaderConfig) -> Self {
        Self::with_metrics(store, archive, config, Arc::new(ReaderMetrics::new()))
    }

    /// Create a reader recording into shared metrics
    pub fn with_metrics(
        store: S,
        archive: A,
        config: ReaderConfig,
        metrics: Arc<ReaderMetrics>,
    ) -> Self {
        Self {
            store,
            archive,
            config,
            metrics,
        }
    }

    /// Reader metrics
    pub fn metrics(&self) -> &Arc<ReaderMetrics> {
        &self.metrics
    }

    /// Reader configuration
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Fetch and fuse a block.
    ///
    /// With `block_hash`, that specific (possibly non-canonical) block is
    /// served if any finality tier of the row holds it.
    ///
    /// A row that exists but has no finality tier holding a block hash is
    /// `NotAvailable`. Stores report a row with no populated families as
    /// absent, so that case reads the archive and is `NotFound` without it.
    pub async fn fetch_block(
        &self,
        chain_id: ChainId,
        block_number: BlockNumber,
        block_hash: Option<&H256>,
    ) -> FetchResult<CanonicalBlock> {
        self.block_until(chain_id, block_number, block_hash, self.deadline())
            .await
    }

    /// Fetch a block and cut out one transaction with its receipt and traces
    pub async fn fetch_transaction(
        &self,
        chain_id: ChainId,
        block_number: BlockNumber,
        tx_hash: &H256,
    ) -> FetchResult<FusedTransaction> {
        self.transaction_until(chain_id, block_number, tx_hash, self.deadline())
            .await
    }

    /// Look a hash up in the hash index
    pub async fn resolve_hash(&self, hash: &str) -> FetchResult<Locator> {
        self.locator_until(hash, self.deadline()).await
    }

    /// Resolve a block hash, then fetch that block
    pub async fn fetch_block_by_hash(&self, hash: &H256) -> FetchResult<CanonicalBlock> {
        let deadline = self.deadline();
        let (chain_id, block_number) = self.locate(hash, HashType::BlockHash, deadline).await?;
        self.block_until(chain_id, block_number, Some(hash), deadline)
            .await
    }

    /// Resolve a transaction hash, then fetch that transaction
    pub async fn fetch_transaction_by_hash(&self, hash: &H256) -> FetchResult<FusedTransaction> {
        let deadline = self.deadline();
        let (chain_id, block_number) = self
            .locate(hash, HashType::TransactionHash, deadline)
            .await?;
        self.transaction_until(chain_id, block_number, hash, deadline)
            .await
    }

    fn deadline(&self) -> Instant {
        Instant::now() + self.config.request_timeout()
    }

    async fn block_until(
        &self,
        chain_id: ChainId,
        block_number: BlockNumber,
        block_hash: Option<&H256>,
        deadline: Instant,
    ) -> FetchResult<CanonicalBlock> {
        let result = async {
            let bundle = self
                .load_bundle(chain_id, block_number, block_hash, deadline)
                .await?;
            let block = timed!(self.metrics.fusion, { fuse_block(chain_id, &bundle) });
            self.settle(chain_id, block_number, block)
        }
        .await;
        self.finish(result, ReadEvent::BlockFused)
    }

    async fn transaction_until(
        &self,
        chain_id: ChainId,
        block_number: BlockNumber,
        tx_hash: &H256,
        deadline: Instant,
    ) -> FetchResult<FusedTransaction> {
        let result = async {
            let bundle = self
                .load_bundle(chain_id, block_number, None, deadline)
                .await?;
            let fused = timed!(self.metrics.fusion, {
                fuse_block(chain_id, &bundle).and_then(|block| transaction_at(block, tx_hash))
            });
            self.settle(chain_id, block_number, fused)
        }
        .await;
        self.finish(result, ReadEvent::TransactionFused)
    }

    async fn locator_until(&self, hash: &str, deadline: Instant) -> FetchResult<Locator> {
        let key = RowKey::for_hash(hash);
        let filter = FamilyFilter::hash_index().with_cell_limit(self.config.cell_limit);
        let row = self
            .with_deadline(
                "hash index fetch",
                deadline,
                self.store.get_row(Table::Hashes, &key, &filter),
            )
            .await;
        let row = match row {
            Ok(row) => row,
            Err(e) => return self.finish(Err(e), ReadEvent::IndexFetched),
        };
        self.metrics.record(ReadEvent::IndexFetched);

        let report = resolve_index(hash, row.as_ref());
        for _ in &report.ambiguous {
            self.metrics.record(ReadEvent::AmbiguousTier);
        }
        let locator = report.locator;
        tracing::debug!(
            hash = %locator.hash,
            hash_type = ?locator.hash_type,
            status = ?locator.status,
            chain_id = ?locator.chain_id,
            block_number = ?locator.block_number,
            "hash resolved"
        );
        Ok(locator)
    }

    async fn locate(
        &self,
        hash: &H256,
        expected: HashType,
        deadline: Instant,
    ) -> FetchResult<(ChainId, BlockNumber)> {
        let locator = self.locator_until(&hash.to_hex(), deadline).await?;
        match (locator.hash_type, locator.chain_id, locator.block_number) {
            (hash_type, Some(chain_id), Some(block_number)) if hash_type == expected => {
                Ok((chain_id, block_number))
            }
            _ => {
                self.metrics.record(ReadEvent::NotFound);
                Err(FetchError::NotFound)
            }
        }
    }

    /// Fetch the block row, falling back to the archive when it is absent
    async fn load_bundle(
        &self,
        chain_id: ChainId,
        block_number: BlockNumber,
        block_hash: Option<&H256>,
        deadline: Instant,
    ) -> FetchResult<RawBundle> {
        let key = match RowKey::for_block(block_number) {
            Ok(key) => key,
            Err(e) => {
                tracing::debug!(chain_id, block_number, error = %e, "block number outside key space");
                return Err(FetchError::NotFound);
            }
        };
        let filter = FamilyFilter::block_row().with_cell_limit(self.config.cell_limit);

        let row = self
            .with_deadline(
                "row fetch",
                deadline,
                self.store.get_row(Table::Chain(chain_id), &key, &filter),
            )
            .await?;

        match row {
            Some(row) => {
                self.metrics.record(ReadEvent::RowFetched);
                self.bundle_from_row(chain_id, &row, block_hash)
            }
            None => {
                self.bundle_from_archive(chain_id, block_number, block_hash, deadline)
                    .await
            }
        }
    }

    fn bundle_from_row(
        &self,
        chain_id: ChainId,
        row: &Row,
        block_hash: Option<&H256>,
    ) -> FetchResult<RawBundle> {
        let requested = block_hash.map(H256::to_hex);
        let report = resolve_block(row, requested.as_deref());
        for _ in &report.ambiguous {
            self.metrics.record(ReadEvent::AmbiguousTier);
        }

        let Some(resolution) = report.resolution else {
            if requested.is_none() {
                if let Some(tier) = report.ambiguous.into_iter().next() {
                    let err = FuseError::Ambiguous {
                        family: tier.family,
                        candidates: tier.candidates,
                    };
                    return Err(self.downgrade(chain_id, row.key(), err));
                }
            }
            let reason = match &requested {
                Some(hash) => format!("block hash {} not present in row", hash),
                None => "no finality tier holds a block hash".to_string(),
            };
            tracing::info!(chain_id, row_key = %row.key(), reason = %reason, "block not resolvable");
            return Err(FetchError::NotAvailable { reason });
        };

        tracing::debug!(
            chain_id,
            row_key = %row.key(),
            block_hash = %resolution.block_hash,
            status = %resolution.status,
            tier = resolution.tier,
            trace_augmented = resolution.trace_augmented,
            "block resolved"
        );
        RawBundle::from_row(row, &resolution).map_err(|e| self.downgrade(chain_id, row.key(), e))
    }

    async fn bundle_from_archive(
        &self,
        chain_id: ChainId,
        block_number: BlockNumber,
        block_hash: Option<&H256>,
        deadline: Instant,
    ) -> FetchResult<RawBundle> {
        if !self.config.archive_fallback {
            return Err(FetchError::NotFound);
        }
        self.metrics.record(ReadEvent::ArchiveFallback);
        tracing::debug!(chain_id, block_number, "live row absent, reading archive");

        let data = self
            .with_deadline(
                "archive fetch",
                deadline,
                self.archive.get_archived_block(chain_id, block_number),
            )
            .await?
            .ok_or(FetchError::NotFound)?;

        let bundle = RawBundle::from_archive(&data)
            .map_err(|e| self.downgrade(chain_id, &format!("archive/{}", block_number), e))?;
        if let Some(requested) = block_hash {
            if bundle.block_hash != requested.to_hex() {
                return Err(FetchError::NotFound);
            }
        }
        Ok(bundle)
    }

    /// Map a fusion result to a caller-visible one
    fn settle<T>(
        &self,
        chain_id: ChainId,
        block_number: BlockNumber,
        result: Result<T, FuseError>,
    ) -> FetchResult<T> {
        result.map_err(|e| self.downgrade(chain_id, &block_number.to_string(), e))
    }

    /// Log internal faults with context before downgrading them
    fn downgrade(&self, chain_id: ChainId, location: &str, err: FuseError) -> FetchError {
        match &err {
            FuseError::Invalid(reason) => {
                self.metrics.record(ReadEvent::InvalidRow);
                tracing::error!(chain_id, location, reason = %reason, "invalid row");
            }
            FuseError::Ambiguous { family, candidates } => {
                tracing::error!(
                    chain_id,
                    location,
                    family = %family,
                    candidates = ?candidates,
                    "no unambiguous tier left in row"
                );
            }
            FuseError::NotAvailable(reason) => {
                tracing::info!(chain_id, location, reason = %reason, "payload not available");
            }
            FuseError::NotFound(what) => {
                tracing::debug!(chain_id, location, what = %what, "not found in row");
            }
        }
        err.into()
    }

    /// Run one store call, bounded by the request deadline
    async fn with_deadline<T>(
        &self,
        operation: &'static str,
        deadline: Instant,
        fut: impl Future<Output = StorageResult<T>>,
    ) -> FetchResult<T> {
        let start = Instant::now();
        let outcome = tokio::time::timeout_at(deadline, fut).await;
        self.metrics.store_fetch.observe_duration(start.elapsed());

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::warn!(operation, error = %e, "store call failed");
                Err(FetchError::Store(e))
            }
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_ms = self.config.request_timeout_ms,
                    "request deadline passed during store call"
                );
                Err(FetchError::Timeout { operation })
            }
        }
    }

    /// Count the outcome of a request
    fn finish<T>(&self, result: FetchResult<T>, success: ReadEvent) -> FetchResult<T> {
        let event = match &result {
            Ok(_) => success,
            Err(FetchError::NotFound) => ReadEvent::NotFound,
            Err(FetchError::NotAvailable { .. }) => ReadEvent::NotAvailable,
            Err(FetchError::Timeout { .. }) => ReadEvent::Timeout,
            Err(FetchError::Store(_)) => ReadEvent::StoreError,
        };
        self.metrics.record(event);
        result
    }
}
