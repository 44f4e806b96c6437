//! msl-user library - User/auth service
//!
//! Registration and login (argon2 password hashing, JWT issuance),
//! profile CRUD, and the caller's playlists, favorites, and listening
//! history, all in one SQLite database.

use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod password;
pub mod validate;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// HS256 secret for issued bearer tokens
    pub jwt_secret: String,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, jwt_secret: String) -> Self {
        Self { db, jwt_secret }
    }
}

/// Build application router
///
/// Public routes: health, database info, register, login. Everything
/// else requires a bearer token.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/api/users/profile",
            get(api::get_profile).put(api::update_profile),
        )
        .route("/api/users/password", put(api::change_password))
        .route(
            "/api/playlists",
            post(api::create_playlist).get(api::list_playlists),
        )
        .route(
            "/api/playlists/:id",
            get(api::get_playlist)
                .put(api::update_playlist)
                .delete(api::delete_playlist),
        )
        .route("/api/playlists/:id/songs", post(api::add_playlist_song))
        .route(
            "/api/playlists/:id/songs/:song_id",
            delete(api::remove_playlist_song),
        )
        .route(
            "/api/favorites",
            post(api::add_favorite).get(api::list_favorites),
        )
        .route("/api/favorites/:song_id", delete(api::remove_favorite))
        .route(
            "/api/history",
            post(api::record_history).get(api::list_history),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    let public = Router::new()
        .route("/api/auth/register", post(api::register))
        .route("/api/auth/login", post(api::login))
        .route("/api/database/info", get(api::database_info))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
