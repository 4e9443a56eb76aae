//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use privasee_store::RecordStore;

use crate::handlers::{health, records, users};
use crate::state::GatewayState;

/// Create the gateway router with all routes and middleware.
///
/// # Routes
///
/// - `GET /` - Banner
/// - `GET /health` - Health check
/// - `GET /api/records` - List records (`assignedTo`, `search`)
/// - `POST /api/records` - Create record
/// - `GET /api/records/:id` - Get record
/// - `PUT|PATCH /api/records/:id` - Update record
/// - `DELETE /api/records/:id` - Delete record
/// - `POST /api/records/bulk/assign` - Assign several records
/// - `GET /api/users` - List assignable users
pub fn create_router<S>(state: GatewayState<S>) -> Router
where
    S: RecordStore + 'static,
{
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = state.config.request_timeout();

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        // Records
        .route(
            "/api/records",
            get(records::list_records::<S>).post(records::create_record::<S>),
        )
        .route(
            "/api/records/bulk/assign",
            post(records::bulk_assign::<S>),
        )
        .route(
            "/api/records/:id",
            get(records::get_record::<S>)
                .put(records::update_record::<S>)
                .patch(records::update_record::<S>)
                .delete(records::delete_record::<S>),
        )
        // Users
        .route("/api/users", get(users::list_users::<S>))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
