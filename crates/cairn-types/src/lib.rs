//! # cairn-types
//!
//! Canonical record types for Cairn.
//!
//! This crate provides:
//! - [`CanonicalBlock`](block::CanonicalBlock) - Fused block with header, transactions, receipts and traces
//! - [`CanonicalTransaction`](transaction::CanonicalTransaction) - Store-independent transaction
//! - [`CanonicalReceipt`](receipt::CanonicalReceipt) - Receipt with joined logs
//! - [`TraceEntry`](trace::TraceEntry) - One flattened call frame
//! - [`Locator`](status::Locator) - Hash lookup result
//! - The declarative [`schema`] tables mapping source shapes onto these records

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod block;
pub mod receipt;
pub mod schema;
pub mod status;
pub mod trace;
pub mod transaction;

// Re-export commonly used types
pub use block::{CanonicalBlock, CanonicalHeader, FusedTransaction};
pub use receipt::{CanonicalLog, CanonicalReceipt};
pub use schema::{remap, FieldKind, FieldMapping, Remap, RemapError, Setter, SourceShape};
pub use status::{BlockStatus, HashType, Locator, LookupStatus};
pub use trace::{CallFrame, TraceEntry, TraceItem};
pub use transaction::{CanonicalTransaction, TxType};
