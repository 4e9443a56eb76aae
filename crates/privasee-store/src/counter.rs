//! Process-wide record identifier counter.
//!
//! The counter caches the last assigned `_recordId`. It is seeded lazily from
//! the largest identifier in the table on the first create, then advanced by
//! one per successful create. The lock is held across the seed query and the
//! row write, so concurrent creates in one process never share an identifier
//! and a failed write consumes nothing.
//!
//! Separate processes writing to the same table each keep their own counter
//! and can collide.

use std::future::Future;

use privasee_core::RecordId;
use tokio::sync::Mutex;

use crate::error::{Result, StoreError};

/// Cache of the last assigned identifier.
#[derive(Debug, Default)]
pub struct IdCounter {
    last: Mutex<Option<u64>>,
}

impl IdCounter {
    /// Create an unseeded counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a counter that already knows the last assigned identifier.
    #[must_use]
    pub fn seeded(last: u64) -> Self {
        Self {
            last: Mutex::new(Some(last)),
        }
    }

    /// The last identifier handed out, if the counter has been seeded.
    pub async fn current(&self) -> Option<u64> {
        *self.last.lock().await
    }

    /// Assign the next identifier and run `write` with it.
    ///
    /// `seed` is awaited only when the counter has not been seeded yet and
    /// must return the largest identifier in use (0 for an empty table). The
    /// counter advances only if `write` succeeds.
    ///
    /// # Errors
    ///
    /// Returns the error from `seed` or `write`.
    pub async fn assign<S, SF, W, WF, T>(&self, seed: S, write: W) -> Result<T>
    where
        S: FnOnce() -> SF,
        SF: Future<Output = Result<u64>>,
        W: FnOnce(RecordId) -> WF,
        WF: Future<Output = Result<T>>,
    {
        let mut last = self.last.lock().await;
        let current = match *last {
            Some(current) => current,
            None => {
                let max = seed().await?;
                tracing::debug!(max_record_id = max, "Seeded record id counter");
                *last = Some(max);
                max
            }
        };

        let next = current
            .checked_add(1)
            .and_then(|n| RecordId::new(n).ok())
            .ok_or_else(|| StoreError::Malformed("record id counter overflow".to_string()))?;

        let value = write(next).await?;
        *last = Some(next.get());
        Ok(value)
    }
}
