use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::db::DbStatus;
use crate::models::{DbStatusReport, HealthReport};
use crate::state::AppState;

// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    let database = match state.store.status().await {
        DbStatus::Connected => "connected",
        _ => "disconnected",
    };

    Json(HealthReport {
        success: true,
        message: "Server is running".to_string(),
        timestamp: Utc::now(),
        database: database.to_string(),
    })
}

// GET /api/db-status
pub async fn db_status(State(state): State<Arc<AppState>>) -> Json<DbStatusReport> {
    let status = state.store.status().await;
    let text = status.as_str();

    Json(DbStatusReport {
        success: status == DbStatus::Connected,
        database: text.to_string(),
        message: format!("Database connection status: {text}"),
    })
}
