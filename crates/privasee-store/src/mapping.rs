//! Mapping between records and table rows.
//!
//! Optional text fields are stored as empty strings and read back as `None`.
//! Timestamps are stored as RFC 3339 strings, properties in their encoded
//! form.

use chrono::{DateTime, SecondsFormat, Utc};
use privasee_core::{NewRecord, Properties, Record, RecordFilter, RecordId, RecordPatch};
use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::predicate::{integer_of, Predicate};
use crate::table::{Fields, Row};

/// Field names of the `questions_answers` table.
pub mod field {
    /// Public record identifier.
    pub const RECORD_ID: &str = "_recordId";
    /// Placeholder tenant name.
    pub const COMPANY_NAME: &str = "companyName";
    /// Placeholder tenant id.
    pub const COMPANY_ID: &str = "_companyId";
    /// Question text.
    pub const QUESTION: &str = "question";
    /// Answer text.
    pub const ANSWER: &str = "answer";
    /// Question description.
    pub const QUESTION_DESCRIPTION: &str = "questionDescription";
    /// Creation time.
    pub const CREATED_AT: &str = "createdAt";
    /// Creator identity.
    pub const CREATED_BY: &str = "createdBy";
    /// Last mutation time.
    pub const UPDATED_AT: &str = "updatedAt";
    /// Last editor identity.
    pub const UPDATED_BY: &str = "updatedBy";
    /// Assignee identity.
    pub const ASSIGNED_TO: &str = "assignedTo";
    /// Encoded properties.
    pub const PROPERTIES: &str = "properties";
}

/// Format a timestamp the way it is stored.
#[must_use]
pub fn timestamp(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

fn text(value: Option<&str>) -> Value {
    Value::String(value.unwrap_or_default().to_string())
}

/// Fields of a freshly created row.
#[must_use]
pub fn fields_for_new(id: RecordId, input: &NewRecord, now: DateTime<Utc>) -> Fields {
    let created_at = input.created_at.unwrap_or(now);
    let updated_at = input.updated_at.unwrap_or(created_at);
    let updated_by = input
        .updated_by
        .as_deref()
        .filter(|by| !by.is_empty())
        .unwrap_or(&input.created_by);

    let mut fields = Fields::new();
    fields.insert(field::RECORD_ID.into(), id.get().into());
    if let Some(name) = &input.company_name {
        fields.insert(field::COMPANY_NAME.into(), name.clone().into());
    }
    if let Some(company_id) = input.company_id {
        fields.insert(field::COMPANY_ID.into(), company_id.into());
    }
    fields.insert(field::QUESTION.into(), input.question.clone().into());
    fields.insert(field::ANSWER.into(), text(input.answer.as_deref()));
    fields.insert(
        field::QUESTION_DESCRIPTION.into(),
        text(input.question_description.as_deref()),
    );
    fields.insert(field::CREATED_AT.into(), timestamp(created_at));
    fields.insert(field::CREATED_BY.into(), input.created_by.clone().into());
    fields.insert(field::UPDATED_AT.into(), timestamp(updated_at));
    fields.insert(field::UPDATED_BY.into(), updated_by.into());
    fields.insert(field::ASSIGNED_TO.into(), text(input.assigned_to.as_deref()));
    fields.insert(field::PROPERTIES.into(), input.properties.encode().into());
    fields
}

/// Fields written by a partial update. `updatedAt` is always stamped.
#[must_use]
pub fn fields_for_patch(patch: &RecordPatch, now: DateTime<Utc>) -> Fields {
    let mut fields = Fields::new();
    let mut set = |name: &str, value: Option<Value>| {
        if let Some(value) = value {
            fields.insert(name.to_string(), value);
        }
    };

    set(field::QUESTION, patch.question.clone().map(Value::from));
    set(field::ANSWER, patch.answer.clone().map(Value::from));
    set(
        field::QUESTION_DESCRIPTION,
        patch.question_description.clone().map(Value::from),
    );
    set(field::UPDATED_BY, patch.updated_by.clone().map(Value::from));
    set(field::ASSIGNED_TO, patch.assigned_to.clone().map(Value::from));
    set(
        field::PROPERTIES,
        patch.properties.as_ref().map(|p| p.encode().into()),
    );
    set(field::COMPANY_NAME, patch.company_name.clone().map(Value::from));
    set(field::COMPANY_ID, patch.company_id.map(Value::from));

    fields.insert(field::UPDATED_AT.into(), timestamp(now));
    fields
}

/// Fields written when assigning a row.
#[must_use]
pub fn fields_for_assignment(assigned_to: &str, updated_by: &str, now: DateTime<Utc>) -> Fields {
    let mut fields = Fields::new();
    fields.insert(field::ASSIGNED_TO.into(), assigned_to.into());
    fields.insert(field::UPDATED_BY.into(), updated_by.into());
    fields.insert(field::UPDATED_AT.into(), timestamp(now));
    fields
}

fn string_field(fields: &Fields, name: &str) -> Option<String> {
    match fields.get(name)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn non_blank(fields: &Fields, name: &str) -> Option<String> {
    string_field(fields, name).filter(|s| !s.trim().is_empty())
}

fn time_field(fields: &Fields, name: &str) -> Option<DateTime<Utc>> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

/// Read the public identifier of a row.
///
/// # Errors
///
/// Returns `StoreError::Malformed` if the row carries no valid `_recordId`.
pub fn record_id_of(row: &Row) -> Result<RecordId> {
    row.fields
        .get(field::RECORD_ID)
        .and_then(integer_of)
        .and_then(|n| RecordId::new(n).ok())
        .ok_or_else(|| StoreError::Malformed(format!("row {} has no valid _recordId", row.id)))
}

/// Convert a stored row into a record.
///
/// Missing `createdAt` falls back to the row's creation time; missing
/// `updatedAt`/`updatedBy` fall back to their `created` counterparts.
///
/// # Errors
///
/// Returns `StoreError::Malformed` if the identifier or creation time is
/// missing.
pub fn record_from_row(row: &Row) -> Result<Record> {
    let fields = &row.fields;
    let record_id = record_id_of(row)?;
    let created_at = time_field(fields, field::CREATED_AT)
        .or(row.created_time)
        .ok_or_else(|| StoreError::Malformed(format!("row {} has no creation time", row.id)))?;
    let created_by = string_field(fields, field::CREATED_BY).unwrap_or_default();

    Ok(Record {
        record_id,
        company_name: non_blank(fields, field::COMPANY_NAME),
        company_id: fields.get(field::COMPANY_ID).and_then(integer_of),
        question: string_field(fields, field::QUESTION).unwrap_or_default(),
        answer: non_blank(fields, field::ANSWER),
        question_description: non_blank(fields, field::QUESTION_DESCRIPTION),
        created_at,
        updated_at: time_field(fields, field::UPDATED_AT).unwrap_or(created_at),
        updated_by: non_blank(fields, field::UPDATED_BY).unwrap_or_else(|| created_by.clone()),
        created_by,
        assigned_to: non_blank(fields, field::ASSIGNED_TO),
        properties: string_field(fields, field::PROPERTIES)
            .map(|encoded| Properties::decode(&encoded))
            .unwrap_or_default(),
    })
}

/// Predicate selecting a single record by identifier.
#[must_use]
pub fn by_id(id: RecordId) -> Predicate {
    Predicate::equals(field::RECORD_ID, id.get())
}

/// Predicate selecting any of the given identifiers.
#[must_use]
pub fn by_ids(ids: &[RecordId]) -> Predicate {
    Predicate::or(ids.iter().copied().map(by_id).collect())
}

/// Translate a listing filter into a predicate; `None` matches everything.
#[must_use]
pub fn filter_predicate(filter: &RecordFilter) -> Option<Predicate> {
    let mut axes = Vec::new();

    if !filter.assigned_to.is_empty() {
        axes.push(Predicate::or(
            filter
                .assigned_to
                .iter()
                .map(|who| Predicate::equals(field::ASSIGNED_TO, who.as_str()))
                .collect(),
        ));
    }
    if let Some(query) = filter.effective_search() {
        axes.push(Predicate::or(vec![
            Predicate::contains(field::QUESTION, query),
            Predicate::contains(field::ANSWER, query),
        ]));
    }

    if axes.is_empty() {
        None
    } else {
        Some(Predicate::and(axes))
    }
}
