//! msl-catalog library - Catalog service
//!
//! Song objects in a media library directory with SQLite metadata:
//! list/get/upload/delete plus time-limited signed stream URLs and the
//! verifying media route that serves the bytes.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::store::MediaStore;

pub mod api;
pub mod config;
pub mod error;
pub mod store;

/// Largest accepted upload (bytes)
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Metadata database
    pub db: SqlitePool,
    /// Media library directory
    pub store: MediaStore,
    /// Base URL for public and signed media URLs
    pub public_base_url: String,
    /// Secret for signed stream URLs
    pub signing_secret: String,
}

impl AppState {
    /// Create new application state
    pub fn new(
        db: SqlitePool,
        store: MediaStore,
        public_base_url: String,
        signing_secret: String,
    ) -> Self {
        Self {
            db,
            store,
            public_base_url,
            signing_secret,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/songs",
            get(api::list_songs)
                .post(api::upload_song)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/songs/:id", get(api::get_song).delete(api::delete_song))
        .route("/api/songs/:id/stream-url", get(api::get_stream_url))
        .route("/media/:name", get(api::serve_media))
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
