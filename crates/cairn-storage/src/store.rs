//! Store seams consumed by the reader

use crate::error::StorageResult;
use crate::families::FamilyFilter;
use crate::key::{RowKey, Table};
use crate::row::Row;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// Point reads against the wide-column store
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Fetch one row restricted to `filter`.
    ///
    /// Returns `None` when the row has no cell in any requested family.
    async fn get_row(
        &self,
        table: Table,
        key: &RowKey,
        filter: &FamilyFilter,
    ) -> StorageResult<Option<Row>>;
}

/// Read access to archived block bundles
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Fetch the raw JSON bundle `{block, receipts, traces}` for a block
    async fn get_archived_block(&self, chain_id: u64, block_number: u64) -> StorageResult<Option<Bytes>>;
}

#[async_trait]
impl<T: RowStore + ?Sized> RowStore for Arc<T> {
    async fn get_row(
        &self,
        table: Table,
        key: &RowKey,
        filter: &FamilyFilter,
    ) -> StorageResult<Option<Row>> {
        (**self).get_row(table, key, filter).await
    }
}

#[async_trait]
impl<T: ArchiveStore + ?Sized> ArchiveStore for Arc<T> {
    async fn get_archived_block(&self, chain_id: u64, block_number: u64) -> StorageResult<Option<Bytes>> {
        (**self).get_archived_block(chain_id, block_number).await
    }
}
