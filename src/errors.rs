use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::{ApiResponse, FieldError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("All required fields must be provided")]
    MissingFields(Vec<FieldError>),

    #[error("Validation error")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("Endpoint not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::MissingFields(errors) => (
                StatusCode::BAD_REQUEST,
                ApiResponse::failure("All required fields must be provided", Some(errors)),
            ),
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                ApiResponse::failure("Validation error", Some(errors)),
            ),
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, ApiResponse::failure(message, None))
            }
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                ApiResponse::failure("Endpoint not found", None),
            ),
            // Detail stays in the server log.
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::failure("Internal server error", None),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}
