use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::errors::AppError;

pub async fn not_found() -> AppError {
    AppError::NotFound
}

/// Last-resort response for a handler that panicked.
///
/// The panic message is only included when `expose_detail` is set.
pub fn panic_response(expose_detail: bool, err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(error = %detail, "server error");

    let mut body = json!({
        "success": false,
        "message": "Internal server error",
    });
    if expose_detail {
        body["error"] = json!(detail);
    }

    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
