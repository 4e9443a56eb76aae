//! Tabular store abstraction.
//!
//! A [`Table`] is a remote spreadsheet-style table: rows have an opaque
//! handle chosen by the store and a map of named fields. Records are mapped
//! onto rows by [`crate::mapping`].

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::predicate::Predicate;

/// Named cell values of a row.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Opaque row handle assigned by the table (e.g. `recXXXXXXXXXXXXXX`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    /// Wrap a handle returned by the table.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The handle as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A row read from or written to a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Store-assigned handle.
    pub id: RowId,
    /// When the store created the row, if it reports it.
    pub created_time: Option<DateTime<Utc>>,
    /// Cell values.
    pub fields: Fields,
}

/// A change to apply to one row. Only the listed fields are touched.
#[derive(Debug, Clone, PartialEq)]
pub struct RowUpdate {
    /// Row to change.
    pub id: RowId,
    /// Fields to overwrite.
    pub fields: Fields,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

impl Direction {
    /// The name Airtable uses for this direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// A sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    /// Field to sort on.
    pub field: String,
    /// Direction.
    pub direction: Direction,
}

/// Parameters of a row selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectQuery {
    /// Rows must match this predicate; `None` selects all rows.
    pub filter: Option<Predicate>,
    /// Sort keys, most significant first.
    pub sort: Vec<Sort>,
    /// Upper bound on the number of rows returned.
    pub max_records: Option<usize>,
    /// Only return these fields; empty returns all of them.
    pub fields: Vec<String>,
}

impl SelectQuery {
    /// Select every row.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to rows matching `predicate`.
    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filter = Some(predicate);
        self
    }

    /// Restrict to rows matching `predicate` when one is given.
    #[must_use]
    pub fn filter_opt(mut self, predicate: Option<Predicate>) -> Self {
        self.filter = predicate;
        self
    }

    /// Append a sort key.
    #[must_use]
    pub fn sort(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.sort.push(Sort {
            field: field.into(),
            direction,
        });
        self
    }

    /// Cap the number of returned rows.
    #[must_use]
    pub const fn max_records(mut self, max: usize) -> Self {
        self.max_records = Some(max);
        self
    }

    /// Project the given fields only.
    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

/// Primitive operations of a remote table.
///
/// Implementations perform no retries: a failed call returns its error
/// immediately.
#[async_trait]
pub trait Table: Send + Sync {
    /// Return the rows matching `query`, following pagination to the end.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be reached or rejects the query.
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>>;

    /// Insert a row and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be reached or rejects the row.
    async fn create(&self, fields: Fields) -> Result<Row>;

    /// Apply field updates to existing rows and return them as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be reached or rejects an update.
    async fn update(&self, updates: Vec<RowUpdate>) -> Result<Vec<Row>>;

    /// Permanently delete rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be reached or rejects the request.
    async fn destroy(&self, ids: &[RowId]) -> Result<()>;
}
