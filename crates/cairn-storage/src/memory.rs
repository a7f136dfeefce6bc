//! In-memory store and archive, used by tests and fixtures

use crate::error::StorageResult;
use crate::families::FamilyFilter;
use crate::key::{RowKey, Table};
use crate::row::{Cell, Row};
use crate::store::{ArchiveStore, RowStore};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-memory [`RowStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<HashMap<(Table, RowKey), Row>>,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one cell
    pub fn put_cell(
        &self,
        table: Table,
        key: &RowKey,
        family: &str,
        column: &str,
        value: impl Into<Bytes>,
        version: u64,
    ) {
        let mut rows = self.rows.write();
        rows.entry((table, key.clone()))
            .or_insert_with(|| Row::new(key))
            .insert(family, column, Cell::new(value, version));
    }

    /// Number of stored rows
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Check if the store holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn get_row(
        &self,
        table: Table,
        key: &RowKey,
        filter: &FamilyFilter,
    ) -> StorageResult<Option<Row>> {
        let rows = self.rows.read();
        let Some(stored) = rows.get(&(table, key.clone())) else {
            return Ok(None);
        };

        let mut row = Row::new(key);
        for family in filter.families() {
            for column in stored.columns_of(family) {
                for cell in stored.cells(family, column).iter().take(filter.cell_limit()) {
                    row.insert(family, column, cell.clone());
                }
            }
        }
        Ok((!row.is_empty()).then_some(row))
    }
}

/// In-memory [`ArchiveStore`]
#[derive(Debug, Default)]
pub struct MemoryArchive {
    bundles: RwLock<HashMap<(u64, u64), Bytes>>,
}

impl MemoryArchive {
    /// Empty archive
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw bundle
    pub fn put_bundle(&self, chain_id: u64, block_number: u64, bundle: impl Into<Bytes>) {
        self.bundles
            .write()
            .insert((chain_id, block_number), bundle.into());
    }
}

#[async_trait]
impl ArchiveStore for MemoryArchive {
    async fn get_archived_block(&self, chain_id: u64, block_number: u64) -> StorageResult<Option<Bytes>> {
        Ok(self.bundles.read().get(&(chain_id, block_number)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_row() {
        let store = MemoryStore::new();
        let key = RowKey::for_block(1).unwrap();
        let row = store
            .get_row(Table::Chain(1), &key, &FamilyFilter::block_row())
            .await
            .unwrap();
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn test_filter_limits_families_and_versions() {
        let store = MemoryStore::new();
        let key = RowKey::for_block(1).unwrap();
        store.put_cell(Table::Chain(1), &key, "finalized", "0xaa", "", 1);
        store.put_cell(Table::Chain(1), &key, "logs", "0xaa", "v1", 1);
        store.put_cell(Table::Chain(1), &key, "logs", "0xaa", "v2", 2);

        let filter = FamilyFilter::new(["logs"]);
        let row = store
            .get_row(Table::Chain(1), &key, &filter)
            .await
            .unwrap()
            .unwrap();
        assert!(!row.family_exists("finalized"));
        assert_eq!(row.cells("logs", "0xaa").len(), 1);
        assert_eq!(row.latest_cell("logs", "0xaa").unwrap().value, Bytes::from("v2"));

        let filter = FamilyFilter::new(["logs"]).with_cell_limit(5);
        let row = store
            .get_row(Table::Chain(1), &key, &filter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.cells("logs", "0xaa").len(), 2);
    }

    #[tokio::test]
    async fn test_row_outside_filter_is_absent() {
        let store = MemoryStore::new();
        let key = RowKey::for_block(3).unwrap();
        store.put_cell(Table::Chain(1), &key, "contracts", "0xaa", "[]", 1);
        let row = store
            .get_row(Table::Chain(1), &key, &FamilyFilter::new(["finalized"]))
            .await
            .unwrap();
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn test_tables_are_separate() {
        let store = MemoryStore::new();
        let key = RowKey::for_block(1).unwrap();
        store.put_cell(Table::Chain(1), &key, "finalized", "0xaa", "", 1);
        let other = store
            .get_row(Table::Chain(2), &key, &FamilyFilter::block_row())
            .await
            .unwrap();
        assert!(other.is_none());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_archive() {
        let archive = MemoryArchive::new();
        archive.put_bundle(1, 10, "{}");
        assert_eq!(archive.get_archived_block(1, 10).await.unwrap(), Some(Bytes::from("{}")));
        assert_eq!(archive.get_archived_block(1, 11).await.unwrap(), None);
    }
}
