//! Storage error types

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// RocksDB error
    #[error("rocksdb error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    /// Invalid column family
    #[error("invalid column family: {0}")]
    InvalidColumnFamily(String),

    /// Row key could not be encoded or decoded
    #[error("invalid row key: {0}")]
    InvalidKey(String),

    /// Stored bytes do not follow the physical cell layout
    #[error("invalid data format: {0}")]
    InvalidFormat(String),

    /// Blocking store task failed to complete
    #[error("store task failed: {0}")]
    Task(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
