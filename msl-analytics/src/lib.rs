//! msl-analytics library - Analytics service
//!
//! Append-only play/engagement events with atomically maintained
//! denormalized counters, plus trending / insights / platform
//! aggregation endpoints over the event tables.

use axum::routing::{get, post};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod aggregate;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod period;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/analytics/plays", post(api::track_play))
        .route("/api/analytics/songs/:song_id", get(api::get_song_analytics))
        .route("/api/analytics/trending", get(api::get_trending))
        .route("/api/analytics/users/:user_id/history", get(api::get_user_history))
        .route(
            "/api/analytics/users/:user_id/recommendations",
            get(api::get_recommendations),
        )
        .route("/api/analytics/users/:user_id/insights", get(api::get_user_insights))
        .route("/api/analytics/platform", get(api::get_platform_analytics))
        .route("/api/analytics/dashboard", get(api::get_dashboard))
        .route("/api/analytics/engagement", post(api::record_engagement))
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
