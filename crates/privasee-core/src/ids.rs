//! Record identifier type.
//!
//! Records carry a public integer identifier (`_recordId`) that is distinct
//! from the opaque row handle the backing table uses internally.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Public identifier of a record.
///
/// Always a positive integer. Assigned once at creation and never changed.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct RecordId(u64);

impl RecordId {
    /// Create a `RecordId` from a raw value.
    ///
    /// # Errors
    ///
    /// Returns `IdError::Zero` if `value` is zero.
    pub const fn new(value: u64) -> Result<Self, IdError> {
        if value == 0 {
            return Err(IdError::Zero);
        }
        Ok(Self(value))
    }

    /// Return the raw integer value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdError::NotAnInteger(s.to_string()));
        }
        let value = s
            .parse::<u64>()
            .map_err(|_| IdError::NotAnInteger(s.to_string()))?;
        Self::new(value)
    }
}

impl TryFrom<u64> for RecordId {
    type Error = IdError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RecordId> for u64 {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

/// Errors from parsing or constructing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The input is not a base-10 unsigned integer.
    #[error("not a positive integer: {0:?}")]
    NotAnInteger(String),

    /// Record identifiers start at 1.
    #[error("record id must be positive")]
    Zero,
}
