//! RocksDB-backed row store
//!
//! Every family is a column family. A cell is one RocksDB entry keyed
//! `table \0 row \0 column \0 inverted_version`, where the version is stored
//! as `u64::MAX - version` big-endian so a forward scan yields newest first.

use crate::error::{StorageError, StorageResult};
use crate::families::{all_families, FamilyFilter};
use crate::key::{RowKey, Table};
use crate::row::{Cell, Row};
use crate::store::RowStore;
use async_trait::async_trait;
use bytes::Bytes;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode,
    MultiThreaded, Options,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace};

type RocksDB = DBWithThreadMode<MultiThreaded>;

const SEPARATOR: u8 = 0;
const VERSION_LEN: usize = 8;

/// Database configuration
#[derive(Clone, Debug)]
pub struct DbConfig {
    /// Create database if missing
    pub create_if_missing: bool,
    /// Maximum number of open files
    pub max_open_files: i32,
    /// Write buffer size
    pub write_buffer_size: usize,
    /// Maximum write buffers
    pub max_write_buffer_number: i32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            max_open_files: 512,
            write_buffer_size: 64 * 1024 * 1024, // 64MB
            max_write_buffer_number: 3,
        }
    }
}

impl DbConfig {
    fn options(&self) -> Options {
        let mut opts = Options::default();
        opts.create_if_missing(self.create_if_missing);
        opts.create_missing_column_families(true);
        opts.set_max_open_files(self.max_open_files);
        opts.set_write_buffer_size(self.write_buffer_size);
        opts.set_max_write_buffer_number(self.max_write_buffer_number);
        opts
    }
}

/// [`RowStore`] over a RocksDB database
#[derive(Clone)]
pub struct RocksRowStore {
    db: Arc<RocksDB>,
    path: String,
}

impl RocksRowStore {
    /// Open for reading and writing, creating missing column families
    pub fn open(path: impl AsRef<Path>, config: &DbConfig) -> StorageResult<Self> {
        let path = path.as_ref().to_string_lossy().to_string();
        let cf_descriptors: Vec<ColumnFamilyDescriptor> = all_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = RocksDB::open_cf_descriptors(&config.options(), &path, cf_descriptors)?;
        debug!(path = %path, "row store opened");
        Ok(Self {
            db: Arc::new(db),
            path,
        })
    }

    /// Open an existing database read-only
    pub fn open_read_only(path: impl AsRef<Path>, config: &DbConfig) -> StorageResult<Self> {
        let path = path.as_ref().to_string_lossy().to_string();
        let mut opts = config.options();
        opts.create_if_missing(false);
        let db = RocksDB::open_cf_for_read_only(&opts, &path, all_families(), false)?;
        debug!(path = %path, "row store opened read-only");
        Ok(Self {
            db: Arc::new(db),
            path,
        })
    }

    /// Get database path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Write one cell
    pub fn put_cell(
        &self,
        table: Table,
        key: &RowKey,
        family: &str,
        column: &str,
        value: &[u8],
        version: u64,
    ) -> StorageResult<()> {
        if column.as_bytes().contains(&SEPARATOR) {
            return Err(StorageError::InvalidKey(format!(
                "column contains separator: {:?}",
                column
            )));
        }
        let cf = get_cf(&self.db, family)?;
        let mut physical = row_prefix(table, key);
        physical.extend_from_slice(column.as_bytes());
        physical.push(SEPARATOR);
        physical.extend_from_slice(&(u64::MAX - version).to_be_bytes());
        self.db.put_cf(&cf, physical, value)?;
        Ok(())
    }

    fn get_row_blocking(
        db: &RocksDB,
        table: Table,
        key: &RowKey,
        filter: &FamilyFilter,
    ) -> StorageResult<Option<Row>> {
        let prefix = row_prefix(table, key);
        let mut row = Row::new(key);

        for family in filter.families() {
            let cf = get_cf(db, family)?;
            let mut last_column: Option<String> = None;
            let mut kept = 0usize;

            let iter = db.iterator_cf(&cf, IteratorMode::From(&prefix, Direction::Forward));
            for item in iter {
                let (physical, value) = item?;
                if !physical.starts_with(&prefix) {
                    break;
                }
                let (column, version) = split_cell_key(&physical[prefix.len()..])?;

                if last_column.as_deref() != Some(column) {
                    last_column = Some(column.to_string());
                    kept = 0;
                }
                if kept >= filter.cell_limit() {
                    continue;
                }
                kept += 1;
                row.insert(family, column, Cell::new(Bytes::from(value.into_vec()), version));
            }
        }

        trace!(table = %table, key = %key, empty = row.is_empty(), "row read");
        Ok((!row.is_empty()).then_some(row))
    }
}

#[async_trait]
impl RowStore for RocksRowStore {
    async fn get_row(
        &self,
        table: Table,
        key: &RowKey,
        filter: &FamilyFilter,
    ) -> StorageResult<Option<Row>> {
        let db = Arc::clone(&self.db);
        let key = key.clone();
        let filter = filter.clone();
        tokio::task::spawn_blocking(move || Self::get_row_blocking(&db, table, &key, &filter))
            .await
            .map_err(|e| StorageError::Task(e.to_string()))?
    }
}

/// Get column family handle
fn get_cf<'a>(db: &'a RocksDB, name: &str) -> StorageResult<Arc<BoundColumnFamily<'a>>> {
    db.cf_handle(name)
        .ok_or_else(|| StorageError::InvalidColumnFamily(name.to_string()))
}

fn row_prefix(table: Table, key: &RowKey) -> Vec<u8> {
    let table = table.name();
    let mut prefix = Vec::with_capacity(table.len() + key.as_str().len() + 2);
    prefix.extend_from_slice(table.as_bytes());
    prefix.push(SEPARATOR);
    prefix.extend_from_slice(key.as_str().as_bytes());
    prefix.push(SEPARATOR);
    prefix
}

/// Split `column \0 inverted_version` into column name and version
fn split_cell_key(rest: &[u8]) -> StorageResult<(&str, u64)> {
    if rest.len() < VERSION_LEN + 1 {
        return Err(StorageError::InvalidFormat("cell key too short".to_string()));
    }
    let split = rest.len() - VERSION_LEN;
    if rest[split - 1] != SEPARATOR {
        return Err(StorageError::InvalidFormat("missing version separator".to_string()));
    }
    let column = std::str::from_utf8(&rest[..split - 1])
        .map_err(|e| StorageError::InvalidFormat(e.to_string()))?;
    let mut inverted = [0u8; VERSION_LEN];
    inverted.copy_from_slice(&rest[split..]);
    Ok((column, u64::MAX - u64::from_be_bytes(inverted)))
}
