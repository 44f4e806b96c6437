//! Play tracking
//!
//! Inserting the play event is the operation; the counter bumps are
//! best-effort denormalization. A failed bump is logged and the request
//! still succeeds, but the bump itself is a single atomic upsert, so
//! concurrent plays of the same song never lose an update.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::{db, AppState};

/// Placeholder listener id for plays without a user
pub const ANONYMOUS: &str = "anonymous";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPlayRequest {
    pub song_id: Option<String>,
    pub user_id: Option<String>,
    pub duration: Option<i64>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPlayResponse {
    pub success: bool,
    pub play_id: String,
    pub message: String,
}

/// POST /api/analytics/plays
pub async fn track_play(
    State(state): State<AppState>,
    Json(request): Json<TrackPlayRequest>,
) -> ApiResult<(StatusCode, Json<TrackPlayResponse>)> {
    let Some(song_id) = request.song_id.filter(|s| !s.is_empty()) else {
        return Err(ApiError::BadRequest("songId is required".to_string()));
    };

    let user_id = request
        .user_id
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| ANONYMOUS.to_string());
    let duration = request.duration.unwrap_or(0).max(0);
    let timestamp = match request.timestamp.as_deref() {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| ApiError::BadRequest(format!("Invalid timestamp: {}", raw)))?,
        None => Utc::now(),
    };

    let play_id = Uuid::new_v4().to_string();
    db::insert_play(&state.db, &play_id, &song_id, &user_id, duration, &timestamp).await?;

    // Best-effort counter updates
    if let Err(err) = db::bump_song_analytics(&state.db, &song_id).await {
        warn!("Failed to update song analytics for {}: {}", song_id, err);
    }
    if user_id != ANONYMOUS {
        if let Err(err) = db::bump_user_analytics(&state.db, &user_id).await {
            warn!("Failed to update user analytics for {}: {}", user_id, err);
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(TrackPlayResponse {
            success: true,
            play_id,
            message: "Play tracked successfully".to_string(),
        }),
    ))
}
