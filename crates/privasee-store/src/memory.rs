//! In-memory table.
//!
//! Evaluates selections locally with the same predicate trees that the
//! Airtable table compiles to formulas. Used for local runs without an
//! Airtable base and throughout the tests.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::table::{Direction, Fields, Row, RowId, RowUpdate, SelectQuery, Sort, Table};

#[derive(Debug, Default)]
struct MemoryState {
    rows: Vec<Row>,
    next_seq: u64,
}

impl MemoryState {
    fn insert(&mut self, fields: Fields) -> Row {
        self.next_seq += 1;
        let row = Row {
            id: RowId::new(format!("rec{:014}", self.next_seq)),
            created_time: Some(Utc::now()),
            fields,
        };
        self.rows.push(row.clone());
        row
    }
}

/// A table held in process memory.
#[derive(Debug, Default)]
pub struct MemoryTable {
    state: RwLock<MemoryState>,
    offline: AtomicBool,
}

impl MemoryTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row directly, bypassing the async API. Useful for seeding.
    pub fn insert(&self, fields: Fields) -> RowId {
        self.state.write().insert(fields).id
    }

    /// Number of stored rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().rows.len()
    }

    /// Whether the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().rows.is_empty()
    }

    /// Snapshot of all rows in insertion order.
    #[must_use]
    pub fn rows(&self) -> Vec<Row> {
        self.state.read().rows.clone()
    }

    /// Simulate an unreachable store. While offline every operation fails
    /// with `StoreError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Unavailable("memory table is offline".to_string()));
        }
        Ok(())
    }
}

fn row_not_found(id: &RowId) -> StoreError {
    StoreError::Rejected {
        status: 404,
        message: format!("row {id} does not exist"),
    }
}

/// Order two cells: blanks first, then numbers, then text.
fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Number(_)) => 1,
            Some(_) => 2,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn compare_rows(a: &Row, b: &Row, sort: &[Sort]) -> Ordering {
    for key in sort {
        let ordering = compare_cells(a.fields.get(&key.field), b.fields.get(&key.field));
        let ordering = match key.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn project(row: &Row, fields: &[String]) -> Row {
    if fields.is_empty() {
        return row.clone();
    }
    let projected = row
        .fields
        .iter()
        .filter(|(name, _)| fields.contains(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    Row {
        id: row.id.clone(),
        created_time: row.created_time,
        fields: projected,
    }
}

#[async_trait]
impl Table for MemoryTable {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>> {
        self.check_online()?;

        let state = self.state.read();
        let mut matched: Vec<&Row> = state
            .rows
            .iter()
            .filter(|row| match &query.filter {
                Some(predicate) => predicate.matches(&row.fields),
                None => true,
            })
            .collect();

        matched.sort_by(|a, b| compare_rows(a, b, &query.sort));
        if let Some(max) = query.max_records {
            matched.truncate(max);
        }

        Ok(matched
            .into_iter()
            .map(|row| project(row, &query.fields))
            .collect())
    }

    async fn create(&self, fields: Fields) -> Result<Row> {
        self.check_online()?;
        Ok(self.state.write().insert(fields))
    }

    async fn update(&self, updates: Vec<RowUpdate>) -> Result<Vec<Row>> {
        self.check_online()?;

        let mut state = self.state.write();
        // Validate the whole batch first so a bad handle changes nothing.
        for update in &updates {
            if !state.rows.iter().any(|row| row.id == update.id) {
                return Err(row_not_found(&update.id));
            }
        }

        let mut updated = Vec::with_capacity(updates.len());
        for update in updates {
            if let Some(row) = state.rows.iter_mut().find(|row| row.id == update.id) {
                row.fields.extend(update.fields);
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn destroy(&self, ids: &[RowId]) -> Result<()> {
        self.check_online()?;

        let mut state = self.state.write();
        if let Some(missing) = ids
            .iter()
            .find(|id| !state.rows.iter().any(|row| &row.id == *id))
        {
            return Err(row_not_found(missing));
        }
        state.rows.retain(|row| !ids.contains(&row.id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::Predicate;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn create_then_select() {
        let table = MemoryTable::new();
        let row = table
            .create(fields(json!({"_recordId": 1, "question": "Q"})))
            .await
            .unwrap();
        assert!(row.id.as_str().starts_with("rec"));

        let rows = table.select(&SelectQuery::all()).await.unwrap();
        assert_eq!(rows, vec![row]);
    }

    #[tokio::test]
    async fn select_filters_sorts_and_limits() {
        let table = MemoryTable::new();
        for id in [3, 1, 2] {
            table.insert(fields(json!({"_recordId": id, "question": format!("Q{id}")})));
        }

        let rows = table
            .select(
                &SelectQuery::all()
                    .sort("_recordId", Direction::Desc)
                    .max_records(2)
                    .fields(["_recordId"]),
            )
            .await
            .unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.fields["_recordId"].clone()).collect();
        assert_eq!(ids, vec![json!(3), json!(2)]);
        assert!(rows[0].fields.get("question").is_none());

        let rows = table
            .select(&SelectQuery::all().filter(Predicate::equals("_recordId", 1u64)))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fields["question"], json!("Q1"));
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let table = MemoryTable::new();
        let id = table.insert(fields(json!({"question": "Q", "answer": "old"})));

        let rows = table
            .update(vec![RowUpdate {
                id: id.clone(),
                fields: fields(json!({"answer": "new"})),
            }])
            .await
            .unwrap();
        assert_eq!(rows[0].fields["question"], json!("Q"));
        assert_eq!(rows[0].fields["answer"], json!("new"));
    }

    #[tokio::test]
    async fn update_with_unknown_handle_changes_nothing() {
        let table = MemoryTable::new();
        let id = table.insert(fields(json!({"answer": "old"})));

        let result = table
            .update(vec![
                RowUpdate {
                    id,
                    fields: fields(json!({"answer": "new"})),
                },
                RowUpdate {
                    id: RowId::new("recMissing"),
                    fields: Fields::new(),
                },
            ])
            .await;
        assert!(matches!(result, Err(StoreError::Rejected { status: 404, .. })));
        assert_eq!(table.rows()[0].fields["answer"], json!("old"));
    }

    #[tokio::test]
    async fn destroy_removes_rows() {
        let table = MemoryTable::new();
        let a = table.insert(Fields::new());
        let b = table.insert(Fields::new());

        table.destroy(&[a]).await.unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].id, b);
    }

    #[tokio::test]
    async fn offline_table_is_unavailable() {
        let table = MemoryTable::new();
        table.set_offline(true);
        assert!(matches!(
            table.select(&SelectQuery::all()).await,
            Err(StoreError::Unavailable(_))
        ));
        table.set_offline(false);
        assert!(table.select(&SelectQuery::all()).await.is_ok());
    }

    #[test]
    fn blanks_sort_before_numbers() {
        assert_eq!(compare_cells(None, Some(&json!(1))), Ordering::Less);
        assert_eq!(
            compare_cells(Some(&json!(2)), Some(&json!(10))),
            Ordering::Less
        );
    }
}
