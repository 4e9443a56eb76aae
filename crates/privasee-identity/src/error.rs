//! Identity provider error types.

use thiserror::Error;

/// A result type using `IdentityError`.
pub type Result<T> = std::result::Result<T, IdentityError>;

/// Errors that can occur while reading the user directory.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The management token was refused.
    #[error("identity provider refused credentials: {0}")]
    Unauthorized(String),

    /// Too many requests to the identity provider.
    #[error("rate limited by identity provider")]
    RateLimited,

    /// The identity provider could not be reached or failed.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),

    /// The identity provider answered with something unreadable.
    #[error("malformed identity provider response: {0}")]
    Malformed(String),
}

impl IdentityError {
    /// Returns `true` if a later attempt may succeed.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Unavailable(_))
    }
}
