//! Common error types for primitives

use thiserror::Error;

use crate::address::AddressError;
use crate::bytes::BytesError;
use crate::hash::HashError;
use crate::quantity::QuantityError;

/// Primitive decoding error
#[derive(Debug, Error)]
pub enum PrimitiveError {
    /// Address error
    #[error("address error: {0}")]
    Address(#[from] AddressError),

    /// Hash error
    #[error("hash error: {0}")]
    Hash(#[from] HashError),

    /// Quantity error
    #[error("quantity error: {0}")]
    Quantity(#[from] QuantityError),

    /// Byte string error
    #[error("bytes error: {0}")]
    Bytes(#[from] BytesError),
}
