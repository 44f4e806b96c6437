//! Favorite songs endpoints

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use msl_common::api::auth::Claims;
use serde::Deserialize;

use crate::db::models::FavoriteRow;
use crate::error::{ApiError, ApiResult};
use crate::{db, AppState};

#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    pub song_id: Option<String>,
}

/// POST /api/favorites
///
/// Idempotent: favoriting an already-favorited song succeeds.
pub async fn add_favorite(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<AddFavoriteRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let Some(song_id) = request.song_id.filter(|s| !s.is_empty()) else {
        return Err(ApiError::BadRequest("song_id is required".to_string()));
    };

    db::add_favorite(&state.db, claims.sub, &song_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Song added to favorites",
        })),
    ))
}

/// GET /api/favorites
pub async fn list_favorites(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Vec<FavoriteRow>>> {
    Ok(Json(db::list_favorites(&state.db, claims.sub).await?))
}

/// DELETE /api/favorites/:song_id
pub async fn remove_favorite(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(song_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    if !db::remove_favorite(&state.db, claims.sub, &song_id).await? {
        return Err(ApiError::NotFound(format!(
            "Song not in favorites: {}",
            song_id
        )));
    }
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Song removed from favorites",
    })))
}
