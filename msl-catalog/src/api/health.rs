//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use msl_common::api::types::HealthResponse;
use msl_common::db;

use crate::AppState;

/// GET /health
///
/// Health check endpoint for monitoring. Includes a database liveness
/// probe; does not require authentication.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = db::probe(&state.db).await;
    Json(HealthResponse::new("msl-catalog", database))
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
