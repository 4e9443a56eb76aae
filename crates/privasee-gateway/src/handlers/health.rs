//! Health check and banner endpoints.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Banner returned at the root path.
#[derive(Debug, Serialize)]
pub struct RootResponse {
    /// Greeting.
    pub message: &'static str,
}

/// Health check handler.
///
/// # Example
///
/// ```text
/// GET /health
///
/// Response: 200 OK
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health() -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    };

    (StatusCode::OK, Json(response))
}

/// Root handler, so a browser pointed at the server sees it is up.
pub async fn root() -> impl IntoResponse {
    Json(RootResponse {
        message: "Privasee records API is running",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_returns_ok() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn root_returns_ok() {
        let response = root().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
