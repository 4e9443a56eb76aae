//! Error types for the store adapter.

use privasee_core::{RecordId, ValidationError};
use thiserror::Error;

/// A result type using `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record carries the requested identifier.
    #[error("record not found: {0}")]
    NotFound(RecordId),

    /// The input violates a record invariant.
    #[error("validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// A bulk operation matched none of the supplied identifiers.
    #[error("no records found for the provided ids")]
    NoMatchingRecords,

    /// The backing table could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backing table answered with an error.
    #[error("store rejected request ({status}): {message}")]
    Rejected {
        /// HTTP status returned by the table.
        status: u16,
        /// Error message reported by the table.
        message: String,
    },

    /// A stored row or a store response could not be read.
    #[error("malformed data: {0}")]
    Malformed(String),

    /// The store client is misconfigured.
    #[error("invalid store configuration: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns true if the failure came from the transport rather than the data.
    ///
    /// Nothing in this crate retries; callers decide.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_errors_are_retriable() {
        assert!(StoreError::Unavailable("reset".into()).is_retriable());
        assert!(!StoreError::NoMatchingRecords.is_retriable());
        assert!(!StoreError::Malformed("x".into()).is_retriable());
    }
}
