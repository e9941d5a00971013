//! # API Errors
//!
//! Error taxonomy for the resource handlers, mapped to status codes and the
//! response envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use super::envelope::Envelope;
use crate::validation::FieldError;

/// Result type for handler operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// One or more fields failed validation (422)
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// No row matched the requested key (404)
    #[error("{0} not found!")]
    NotFound(&'static str),

    /// The request body could not be read (400)
    #[error("{0}")]
    BadRequest(String),

    /// Store failure (500). The driver message is logged, never sent to the
    /// client.
    #[error("Internal server error")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ApiError::Validation(errors) => Envelope::invalid(errors),
            ApiError::Database(e) => {
                error!(error = %e, "store operation failed");
                Envelope::fail("Internal server error")
            }
            other => Envelope::fail(other.to_string()),
        };
        (status, Json(body)).into_response()
    }
}
