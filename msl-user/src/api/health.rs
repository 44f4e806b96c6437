//! Health and database info endpoints

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use msl_common::api::types::HealthResponse;
use msl_common::db;

use crate::AppState;

/// GET /health
///
/// Health check endpoint for monitoring. Includes a database liveness
/// probe; does not require authentication.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = db::probe(&state.db).await;
    Json(HealthResponse::new("msl-user", database))
}

/// GET /api/database/info
///
/// Database health snapshot (debugging aid).
pub async fn database_info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let status = db::probe(&state.db).await;
    Json(serde_json::json!({
        "status": status,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
