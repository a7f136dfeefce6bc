//! # cairn-primitives
//!
//! Primitive chain values as they appear in canonical, RPC-shaped output.
//!
//! Every type here serializes as a `0x`-prefixed lowercase hex string and
//! accepts the looser spellings found in stored payloads when deserializing.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod bytes;
mod error;
mod hash;
mod quantity;

pub use address::{Address, AddressError};
pub use bytes::{BytesError, HexBytes};
pub use error::PrimitiveError;
pub use hash::{HashError, H256};
pub use quantity::{Quantity, QuantityError};

// Re-export primitive-types for U256
pub use primitive_types::U256;

/// Chain identifier type
pub type ChainId = u64;

/// Block number type
pub type BlockNumber = u64;
