use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;

use crate::errors::AppError;
use crate::models::{ApiResponse, Booking, BookingInput};
use crate::services::bookings;
use crate::state::AppState;

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BookingInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Booking>>), AppError> {
    let Json(input) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "rejected booking body");
        AppError::BadRequest("Invalid request body".to_string())
    })?;

    let booking = bookings::create_booking(&state, input, Utc::now()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(booking).with_message("Booking created successfully")),
    ))
}

// GET /api/bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Booking>>>, AppError> {
    let bookings = bookings::list_bookings(&state).await?;
    let count = bookings.len();
    Ok(Json(ApiResponse::ok(bookings).with_count(count)))
}
