//! User directory endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use privasee_store::RecordStore;

use crate::error::ApiError;
use crate::state::GatewayState;

/// List users records can be assigned to.
///
/// # Errors
///
/// Returns `ApiError::BadGateway` if the identity provider fails.
pub async fn list_users<S>(
    State(state): State<Arc<GatewayState<S>>>,
) -> Result<impl IntoResponse, ApiError>
where
    S: RecordStore + 'static,
{
    let users = state.directory.list_users().await?;
    Ok(Json(users))
}
