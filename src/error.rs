use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::editor::{EditorError, FieldError};

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
/// Nothing here is fatal to the process; every error is scoped to the
/// triggering request.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The addressed record does not exist.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// One or more form fields failed validation; no write was issued.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// The session lacks the admin capability.
    #[error("Unauthorized")]
    Unauthorized,

    /// A malformed request outside field validation (bad multipart, unknown
    /// sub-collection, ...).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Store, storage or transport failure. Details are logged, not exposed.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<EditorError> for AppError {
    fn from(error: EditorError) -> Self {
        match error {
            EditorError::Validation(fields) => Self::Validation(fields),
            EditorError::Lookup(e) | EditorError::Upload(e) | EditorError::Write(e) => {
                Self::Internal(e)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, json!({ "error": "not found" }))
            }
            AppError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "fields": fields }),
            ),
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" }))
            }
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "An internal error occurred" }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
