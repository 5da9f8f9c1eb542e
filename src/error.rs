//! API error surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::session::StoreError;

/// Errors returned to API clients as structured JSON.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("session already exists: {0}")]
    DuplicateSession(String),
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ApiError::SessionNotFound(id),
            StoreError::Duplicate(id) => ApiError::DuplicateSession(id),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "session_not_found"),
            ApiError::DuplicateSession(_) => (StatusCode::CONFLICT, "duplicate_session"),
            ApiError::MissingParameter(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
