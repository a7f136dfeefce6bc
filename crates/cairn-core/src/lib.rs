//! # cairn-core
//!
//! Canonical block reconstruction for Cairn.
//!
//! This crate turns one block row of the wide-column store into a canonical
//! block:
//! - Finality resolution across competing block hashes
//! - Warehouse and RPC payload remapping into one canonical shape
//! - Receipt, log and call-trace fusion with consistency checks
//! - Hash index lookups for blocks, state roots and transactions
//! - The [`BlockReader`] service with timeouts and archive fallback

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bundle;
pub mod config;
pub mod error;
pub mod finality;
pub mod fuser;
pub mod hash_index;
pub mod reader;
pub mod trace;

#[cfg(test)]
mod testing;

pub use config::ReaderConfig;
pub use error::{FetchError, FetchResult, FuseError};
pub use finality::{resolve_block, AmbiguousTier, FinalityReport, Resolution};
pub use fuser::{fuse_block, fuse_transaction};
pub use hash_index::{resolve_index, resolve_locator, IndexReport};
pub use reader::BlockReader;
