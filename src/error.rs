use std::collections::BTreeMap;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::db::StoreError;

/// Field name -> human readable message, the body of every 4xx response.
pub type FieldErrors = BTreeMap<String, String>;

/// Shorthand for a single-entry error map.
pub fn field_error(field: &str, message: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_string(), message.to_string());
    errors
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation failed")]
    Validation(FieldErrors),

    #[error("conflict")]
    Conflict(FieldErrors),

    #[error("bad credentials")]
    BadCredentials(FieldErrors),

    #[error("not found")]
    NotFound(FieldErrors),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// NotFound without any detail in the body.
    pub fn not_found_silent() -> Self {
        AppError::NotFound(FieldErrors::new())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) | AppError::BadCredentials(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UniqueViolation { field, message } => {
                AppError::Conflict(field_error(field, message))
            }
            StoreError::Backend(e) => AppError::Internal(e),
        }
    }
}

/// Malformed or wrongly typed bodies are reported under the `body` key.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(field_error("body", &rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AppError::Validation(errors)
            | AppError::Conflict(errors)
            | AppError::BadCredentials(errors)
            | AppError::NotFound(errors) => (status, Json(errors)).into_response(),
            AppError::Unauthorized(msg) => (status, Json(json!({ "error": msg }))).into_response(),
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                (status, Json(json!({ "error": "Internal server error" }))).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            AppError::Conflict(field_error("email", "taken")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::not_found_silent().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Unauthorized("nope".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unique_violation_maps_to_conflict() {
        let err: AppError = StoreError::UniqueViolation {
            field: "handle",
            message: "That handle already exists",
        }
        .into();
        match err {
            AppError::Conflict(errors) => {
                assert_eq!(errors["handle"], "That handle already exists");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
