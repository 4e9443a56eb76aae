//! Record endpoints.
//!
//! This module provides handlers for record CRUD and bulk assignment.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use privasee_core::{NewRecord, RecordFilter, RecordId, RecordPatch};
use privasee_store::RecordStore;

use crate::error::ApiError;
use crate::state::GatewayState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Query parameters for listing records.
///
/// `assignedTo` may be repeated and each value may hold a comma-separated
/// list. `searchQuery` is accepted as an alias of `search`; when either is
/// given more than once the last value wins. Other parameters are ignored.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Assignee identities.
    pub assigned_to: Vec<String>,
    /// Search text matched against question and answer.
    pub search: Option<String>,
}

impl ListQuery {
    /// Collect the recognised parameters from raw query pairs.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "assignedTo" => query.assigned_to.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|a| !a.is_empty())
                        .map(ToString::to_string),
                ),
                "search" | "searchQuery" => query.search = Some(value),
                _ => {}
            }
        }
        query
    }

    /// Build the store filter.
    #[must_use]
    pub fn into_filter(self) -> RecordFilter {
        RecordFilter {
            assigned_to: self.assigned_to,
            search_query: self.search,
        }
    }
}

/// Request to assign several records at once.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAssignBody {
    /// Records to assign.
    #[serde(default)]
    pub record_ids: Vec<RecordId>,
    /// New assignee.
    #[serde(default)]
    pub assigned_to: Option<String>,
    /// Identity performing the assignment.
    #[serde(default)]
    pub updated_by: Option<String>,
}

/// Response for a bulk assignment.
#[derive(Debug, Serialize, Deserialize)]
pub struct BulkAssignResponse {
    /// Records that were assigned.
    pub assigned: Vec<RecordId>,
}

// =============================================================================
// Handlers
// =============================================================================

/// List records, optionally filtered.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn list_records<S>(
    State(state): State<Arc<GatewayState<S>>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, ApiError>
where
    S: RecordStore + 'static,
{
    let filter = ListQuery::from_pairs(pairs).into_filter();
    let records = state
        .store
        .list(&filter)
        .await
        .map_err(|e| ApiError::store("fetch records", e))?;

    Ok(Json(records))
}

/// Create a record.
///
/// # Errors
///
/// Returns an error if the body is invalid or the store write fails.
pub async fn create_record<S>(
    State(state): State<Arc<GatewayState<S>>>,
    body: Result<Json<NewRecord>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    S: RecordStore + 'static,
{
    let Json(mut input) = body?;
    input
        .company_name
        .get_or_insert_with(|| state.config.company_name.clone());
    input.company_id.get_or_insert(state.config.company_id);

    let record = state
        .store
        .create(input)
        .await
        .map_err(|e| ApiError::store("create record", e))?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// Get a record by identifier.
///
/// # Errors
///
/// Returns an error if the identifier is invalid or the record is not found.
pub async fn get_record<S>(
    State(state): State<Arc<GatewayState<S>>>,
    Path(record_id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    S: RecordStore + 'static,
{
    let record_id = parse_record_id(&record_id)?;
    let record = state
        .store
        .get(record_id)
        .await
        .map_err(|e| ApiError::store("fetch record", e))?;

    Ok(Json(record))
}

/// Update a record. Serves both `PUT` and `PATCH`.
///
/// # Errors
///
/// Returns an error if the identifier or body is invalid, or the record is
/// not found.
pub async fn update_record<S>(
    State(state): State<Arc<GatewayState<S>>>,
    Path(record_id): Path<String>,
    body: Result<Json<RecordPatch>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    S: RecordStore + 'static,
{
    let record_id = parse_record_id(&record_id)?;
    let Json(patch) = body?;

    let record = state
        .store
        .update(record_id, patch)
        .await
        .map_err(|e| ApiError::store("update record", e))?;

    Ok(Json(record))
}

/// Delete a record.
///
/// # Errors
///
/// Returns an error if the identifier is invalid or the record is not found.
pub async fn delete_record<S>(
    State(state): State<Arc<GatewayState<S>>>,
    Path(record_id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    S: RecordStore + 'static,
{
    let record_id = parse_record_id(&record_id)?;
    state
        .store
        .delete(record_id)
        .await
        .map_err(|e| ApiError::store("delete record", e))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Assign several records to one user.
///
/// # Errors
///
/// Returns an error if the body is incomplete or none of the records exist.
pub async fn bulk_assign<S>(
    State(state): State<Arc<GatewayState<S>>>,
    body: Result<Json<BulkAssignBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    S: RecordStore + 'static,
{
    let Json(body) = body?;

    if body.record_ids.is_empty() {
        return Err(ApiError::BadRequest(
            "recordIds must not be empty".to_string(),
        ));
    }
    let assigned_to = required(body.assigned_to.as_deref(), "assignedTo")?;
    let updated_by = required(body.updated_by.as_deref(), "updatedBy")?;

    let assigned = state
        .store
        .bulk_assign(&body.record_ids, assigned_to, updated_by)
        .await
        .map_err(|e| ApiError::store("bulk assign records", e))?;

    Ok(Json(BulkAssignResponse { assigned }))
}

// =============================================================================
// Helpers
// =============================================================================

/// Parse a record ID from a path segment.
fn parse_record_id(s: &str) -> Result<RecordId, ApiError> {
    s.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid record ID: {s}")))
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, ApiError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{name} is required")))
}
