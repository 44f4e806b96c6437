//! Playlist endpoints
//!
//! Every route operates on the caller's own playlists; a playlist owned
//! by another user is indistinguishable from a missing one (404).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use msl_common::api::auth::Claims;
use serde::{Deserialize, Serialize};

use crate::db::models::{PlaylistRow, PlaylistSongRow};
use crate::error::{ApiError, ApiResult};
use crate::{db, AppState};

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// POST /api/playlists
pub async fn create_playlist(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreatePlaylistRequest>,
) -> ApiResult<(StatusCode, Json<PlaylistRow>)> {
    let Some(name) = request.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) else {
        return Err(ApiError::BadRequest("name is required".to_string()));
    };

    let playlist =
        db::create_playlist(&state.db, claims.sub, name, request.description.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(playlist)))
}

/// GET /api/playlists
pub async fn list_playlists(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Vec<PlaylistRow>>> {
    Ok(Json(db::list_playlists(&state.db, claims.sub).await?))
}

/// Playlist with its songs, ordered by position
#[derive(Debug, Serialize)]
pub struct PlaylistDetail {
    #[serde(flatten)]
    pub playlist: PlaylistRow,
    pub songs: Vec<PlaylistSongRow>,
    pub song_count: usize,
}

/// GET /api/playlists/:id
pub async fn get_playlist(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> ApiResult<Json<PlaylistDetail>> {
    let playlist = db::get_playlist(&state.db, claims.sub, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Playlist not found: {}", id)))?;
    let songs = db::list_playlist_songs(&state.db, id).await?;

    Ok(Json(PlaylistDetail {
        song_count: songs.len(),
        playlist,
        songs,
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlaylistRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

/// PUT /api/playlists/:id
pub async fn update_playlist(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(request): Json<UpdatePlaylistRequest>,
) -> ApiResult<Json<PlaylistRow>> {
    if let Some(name) = &request.name {
        if name.trim().is_empty() {
            return Err(ApiError::BadRequest("name must not be empty".to_string()));
        }
    }

    let playlist = db::update_playlist(
        &state.db,
        claims.sub,
        id,
        request.name.as_deref().map(str::trim),
        request.description.as_deref(),
        request.is_public,
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("Playlist not found: {}", id)))?;

    Ok(Json(playlist))
}

/// DELETE /api/playlists/:id
pub async fn delete_playlist(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    if !db::delete_playlist(&state.db, claims.sub, id).await? {
        return Err(ApiError::NotFound(format!("Playlist not found: {}", id)));
    }
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Playlist deleted successfully",
    })))
}

#[derive(Debug, Deserialize)]
pub struct AddSongRequest {
    pub song_id: Option<String>,
    pub position: Option<i64>,
}

/// POST /api/playlists/:id/songs
pub async fn add_playlist_song(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(request): Json<AddSongRequest>,
) -> ApiResult<(StatusCode, Json<PlaylistSongRow>)> {
    let Some(song_id) = request.song_id.filter(|s| !s.is_empty()) else {
        return Err(ApiError::BadRequest("song_id is required".to_string()));
    };

    // Ownership check first so foreign playlists read as missing
    if db::get_playlist(&state.db, claims.sub, id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Playlist not found: {}", id)));
    }

    let position = request.position.unwrap_or(0);
    match db::add_playlist_song(&state.db, id, &song_id, position).await {
        Ok(row) => Ok((StatusCode::CREATED, Json(row))),
        Err(err)
            if err
                .as_database_error()
                .map(|d| d.is_unique_violation())
                .unwrap_or(false) =>
        {
            Err(ApiError::Conflict("Song already in playlist".to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

/// DELETE /api/playlists/:id/songs/:song_id
pub async fn remove_playlist_song(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, song_id)): Path<(i64, String)>,
) -> ApiResult<Json<serde_json::Value>> {
    if db::get_playlist(&state.db, claims.sub, id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Playlist not found: {}", id)));
    }
    if !db::remove_playlist_song(&state.db, id, &song_id).await? {
        return Err(ApiError::NotFound(format!(
            "Song not in playlist: {}",
            song_id
        )));
    }
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Song removed from playlist",
    })))
}
