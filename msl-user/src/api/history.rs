//! Listening history endpoints

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use msl_common::api::auth::Claims;
use serde::{Deserialize, Serialize};

use crate::db::models::HistoryRow;
use crate::error::{ApiError, ApiResult};
use crate::{db, AppState};

#[derive(Debug, Deserialize)]
pub struct RecordHistoryRequest {
    pub song_id: Option<String>,
    pub play_duration: Option<i64>,
}

/// POST /api/history
pub async fn record_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<RecordHistoryRequest>,
) -> ApiResult<(StatusCode, Json<HistoryRow>)> {
    let Some(song_id) = request.song_id.filter(|s| !s.is_empty()) else {
        return Err(ApiError::BadRequest("song_id is required".to_string()));
    };

    let duration = request.play_duration.unwrap_or(0).max(0);
    let row = db::add_history(&state.db, claims.sub, &song_id, duration).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub items: Vec<HistoryRow>,
    pub pagination: Pagination,
}

/// GET /api/history?limit=&offset=
pub async fn list_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<HistoryResponse>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    let offset = query.offset.unwrap_or(0).max(0);

    let items = db::list_history(&state.db, claims.sub, limit, offset).await?;
    let total = db::count_history(&state.db, claims.sub).await?;

    Ok(Json(HistoryResponse {
        items,
        pagination: Pagination {
            total,
            limit,
            offset,
        },
    }))
}
