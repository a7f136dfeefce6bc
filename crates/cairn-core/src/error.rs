//! Read and fusion error types

use cairn_storage::StorageError;
use cairn_types::RemapError;
use thiserror::Error;

/// Internal fusion faults.
///
/// `Ambiguous` and `Invalid` never reach callers as such: the reader logs
/// them with full context and downgrades them to [`FetchError::NotAvailable`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FuseError {
    /// Nothing exists for the request
    #[error("not found: {0}")]
    NotFound(String),

    /// Data exists but the payload needed to serve it does not yet
    #[error("not available: {0}")]
    NotAvailable(String),

    /// A tier held more than one candidate hash
    #[error("ambiguous {family}: {candidates:?}")]
    Ambiguous {
        /// Family holding the candidates
        family: &'static str,
        /// Competing hashes
        candidates: Vec<String>,
    },

    /// Row contents are inconsistent or undecodable
    #[error("invalid row: {0}")]
    Invalid(String),
}

impl From<RemapError> for FuseError {
    fn from(err: RemapError) -> Self {
        FuseError::Invalid(err.to_string())
    }
}

/// Caller-visible read errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// Nothing exists for the request
    #[error("not found")]
    NotFound,

    /// Data exists but cannot be served yet
    #[error("not available: {reason}")]
    NotAvailable {
        /// Why the data cannot be served
        reason: String,
    },

    /// A store call exceeded the request timeout
    #[error("timed out during {operation}")]
    Timeout {
        /// Store call that timed out
        operation: &'static str,
    },

    /// Store error
    #[error("store error: {0}")]
    Store(#[from] StorageError),
}

impl FetchError {
    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FetchError::NotFound)
    }

    /// Whether the failure came from store access rather than data shape
    pub fn is_store_fault(&self) -> bool {
        matches!(self, FetchError::Timeout { .. } | FetchError::Store(_))
    }
}

impl From<FuseError> for FetchError {
    fn from(err: FuseError) -> Self {
        match err {
            FuseError::NotFound(_) => FetchError::NotFound,
            FuseError::NotAvailable(reason) => FetchError::NotAvailable { reason },
            FuseError::Ambiguous { family, .. } => FetchError::NotAvailable {
                reason: format!("ambiguous {}", family),
            },
            FuseError::Invalid(reason) => FetchError::NotAvailable {
                reason: format!("invalid row: {}", reason),
            },
        }
    }
}

/// Result type for read operations
pub type FetchResult<T> = Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(!FetchError::NotFound.is_retryable());
        assert!(FetchError::NotAvailable { reason: String::new() }.is_retryable());
        assert!(FetchError::Timeout { operation: "row" }.is_retryable());
        assert!(FetchError::Store(StorageError::Task("x".into())).is_retryable());
    }

    #[test]
    fn test_store_fault_split() {
        assert!(FetchError::Timeout { operation: "row" }.is_store_fault());
        assert!(!FetchError::NotAvailable { reason: String::new() }.is_store_fault());
        assert!(!FetchError::NotFound.is_store_fault());
    }

    #[test]
    fn test_downgrade() {
        let err: FetchError = FuseError::Invalid("receipt count".into()).into();
        match err {
            FetchError::NotAvailable { reason } => assert!(reason.contains("receipt count")),
            other => panic!("unexpected: {:?}", other),
        }
        let err: FetchError = FuseError::NotFound("tx".into()).into();
        assert!(matches!(err, FetchError::NotFound));
    }
}
