//! Record store service.
//!
//! This module provides the `RecordStore` trait and the `TableRecordStore`
//! implementation that maps records onto rows of any [`Table`].

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use privasee_core::{NewRecord, Record, RecordFilter, RecordId, RecordPatch};

use crate::counter::IdCounter;
use crate::error::{Result, StoreError};
use crate::mapping::{self, field};
use crate::predicate::integer_of;
use crate::table::{Direction, Row, RowUpdate, SelectQuery, Table};

/// Operations on question/answer records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create a record with the next free identifier.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ValidationFailed` if the question is blank, or a
    /// store error if the row cannot be written.
    async fn create(&self, input: NewRecord) -> Result<Record>;

    /// Get a record by identifier.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no record has this identifier.
    async fn get(&self, id: RecordId) -> Result<Record>;

    /// List records matching `filter`, newest identifier first.
    async fn list(&self, filter: &RecordFilter) -> Result<Vec<Record>>;

    /// Apply a partial update and return the updated record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the record doesn't exist, or
    /// `StoreError::ValidationFailed` if the patch sets a blank question.
    async fn update(&self, id: RecordId, patch: RecordPatch) -> Result<Record>;

    /// Permanently delete a record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the record doesn't exist.
    async fn delete(&self, id: RecordId) -> Result<()>;

    /// Assign every existing record in `ids` to `assigned_to`.
    ///
    /// Identifiers without a record are skipped. Returns the identifiers
    /// that were assigned.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoMatchingRecords` if none of the identifiers
    /// exist.
    async fn bulk_assign(
        &self,
        ids: &[RecordId],
        assigned_to: &str,
        updated_by: &str,
    ) -> Result<Vec<RecordId>>;
}

/// `RecordStore` backed by a [`Table`].
pub struct TableRecordStore<T: Table + ?Sized> {
    table: Arc<T>,
    counter: IdCounter,
}

impl<T: Table + ?Sized> TableRecordStore<T> {
    /// Create a store over `table`.
    #[must_use]
    pub fn new(table: Arc<T>) -> Self {
        Self {
            table,
            counter: IdCounter::new(),
        }
    }

    /// Largest `_recordId` in the table, 0 when empty.
    async fn max_record_id(&self) -> Result<u64> {
        let query = SelectQuery::all()
            .sort(field::RECORD_ID, Direction::Desc)
            .max_records(1)
            .fields([field::RECORD_ID]);
        let rows = self.table.select(&query).await?;

        Ok(rows
            .first()
            .and_then(|row| row.fields.get(field::RECORD_ID))
            .and_then(integer_of)
            .unwrap_or(0))
    }

    /// Resolve the row holding record `id`.
    async fn find_row(&self, id: RecordId) -> Result<Row> {
        let query = SelectQuery::all().filter(mapping::by_id(id)).max_records(1);
        self.table
            .select(&query)
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound(id))
    }
}

impl<T: Table + ?Sized> std::fmt::Debug for TableRecordStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableRecordStore")
            .field("counter", &self.counter)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T: Table + ?Sized + 'static> RecordStore for TableRecordStore<T> {
    async fn create(&self, input: NewRecord) -> Result<Record> {
        input.validate()?;

        let row = self
            .counter
            .assign(
                || self.max_record_id(),
                |id| {
                    let fields = mapping::fields_for_new(id, &input, Utc::now());
                    self.table.create(fields)
                },
            )
            .await?;

        let record = mapping::record_from_row(&row)?;
        tracing::info!(record_id = %record.record_id, row_id = %row.id, "Created record");
        Ok(record)
    }

    async fn get(&self, id: RecordId) -> Result<Record> {
        let row = self.find_row(id).await?;
        mapping::record_from_row(&row)
    }

    async fn list(&self, filter: &RecordFilter) -> Result<Vec<Record>> {
        let query = SelectQuery::all()
            .filter_opt(mapping::filter_predicate(filter))
            .sort(field::RECORD_ID, Direction::Desc);
        let rows = self.table.select(&query).await?;

        let records: Vec<Record> = rows
            .iter()
            .filter_map(|row| match mapping::record_from_row(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(row_id = %row.id, error = %e, "Skipping unreadable row");
                    None
                }
            })
            .collect();

        tracing::debug!(count = records.len(), "Listed records");
        Ok(records)
    }

    async fn update(&self, id: RecordId, patch: RecordPatch) -> Result<Record> {
        patch.validate()?;

        let row = self.find_row(id).await?;
        let update = RowUpdate {
            id: row.id.clone(),
            fields: mapping::fields_for_patch(&patch, Utc::now()),
        };
        let updated = self
            .table
            .update(vec![update])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Malformed(format!("update of row {} returned nothing", row.id)))?;

        tracing::info!(record_id = %id, row_id = %row.id, "Updated record");
        mapping::record_from_row(&updated)
    }

    async fn delete(&self, id: RecordId) -> Result<()> {
        let row = self.find_row(id).await?;
        self.table.destroy(&[row.id.clone()]).await?;

        tracing::info!(record_id = %id, row_id = %row.id, "Deleted record");
        Ok(())
    }

    async fn bulk_assign(
        &self,
        ids: &[RecordId],
        assigned_to: &str,
        updated_by: &str,
    ) -> Result<Vec<RecordId>> {
        if ids.is_empty() {
            return Err(StoreError::NoMatchingRecords);
        }

        let query = SelectQuery::all()
            .filter(mapping::by_ids(ids))
            .fields([field::RECORD_ID]);
        let rows = self.table.select(&query).await?;

        let now = Utc::now();
        let mut assigned = BTreeSet::new();
        let mut updates = Vec::with_capacity(rows.len());
        for row in rows {
            let Ok(record_id) = mapping::record_id_of(&row) else {
                continue;
            };
            assigned.insert(record_id);
            updates.push(RowUpdate {
                id: row.id,
                fields: mapping::fields_for_assignment(assigned_to, updated_by, now),
            });
        }

        if updates.is_empty() {
            tracing::warn!(requested = ids.len(), "Bulk assignment matched no records");
            return Err(StoreError::NoMatchingRecords);
        }

        let missing: Vec<RecordId> = ids
            .iter()
            .copied()
            .filter(|id| !assigned.contains(id))
            .collect();
        if !missing.is_empty() {
            tracing::warn!(?missing, "Bulk assignment skipped unknown record ids");
        }

        self.table.update(updates).await?;

        let assigned: Vec<RecordId> = assigned.into_iter().collect();
        tracing::info!(count = assigned.len(), %assigned_to, "Bulk assigned records");
        Ok(assigned)
    }
}
