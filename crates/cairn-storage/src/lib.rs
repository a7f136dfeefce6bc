//! # cairn-storage
//!
//! Read-side access to the sparse, versioned wide-column store.
//!
//! This crate provides:
//! - The typed [`Row`] model (family -> column -> versioned cells)
//! - Row-key encoding for block rows and hash-index rows
//! - Family and column name constants
//! - The [`RowStore`] and [`ArchiveStore`] seams the reader consumes
//! - An in-memory store, a RocksDB-backed store and a directory archive

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod archive;
pub mod db;
pub mod error;
pub mod families;
pub mod key;
pub mod memory;
pub mod row;
pub mod store;

pub use archive::{DirArchive, NoArchive};
pub use db::{DbConfig, RocksRowStore};
pub use error::{StorageError, StorageResult};
pub use families::FamilyFilter;
pub use key::{RowKey, Table};
pub use memory::{MemoryArchive, MemoryStore};
pub use row::{Cell, Row};
pub use store::{ArchiveStore, RowStore};
