//! Validation errors shared across crates.

use thiserror::Error;

/// Input that violates a record invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The question is missing or blank.
    #[error("question must not be empty")]
    EmptyQuestion,
}
