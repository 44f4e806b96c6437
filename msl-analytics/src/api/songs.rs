//! Per-song analytics

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::period::Period;
use crate::{aggregate, db, AppState};

#[derive(Debug, Deserialize)]
pub struct SongAnalyticsQuery {
    pub period: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongAnalyticsResponse {
    pub song_id: String,
    pub period: String,
    /// Plays within the requested window
    pub play_count: usize,
    pub unique_listeners: usize,
    pub average_duration: i64,
    pub total_duration: i64,
    pub period_plays: usize,
    /// Lifetime counter (denormalized)
    pub total_plays: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_played: Option<String>,
}

/// GET /api/analytics/songs/:song_id?period=
///
/// Window aggregates come from the play events; lifetime totals from the
/// denormalized counter row. Default window is 7d; unknown values mean
/// all time.
pub async fn get_song_analytics(
    State(state): State<AppState>,
    Path(song_id): Path<String>,
    Query(query): Query<SongAnalyticsQuery>,
) -> ApiResult<Json<SongAnalyticsResponse>> {
    let period_str = query.period.unwrap_or_else(|| "7d".to_string());
    let period = Period::parse_or(Some(&period_str), Period::All);

    let rows = db::plays_for_song_since(&state.db, &song_id, period.cutoff(Utc::now())).await?;
    let counters = db::get_song_analytics(&state.db, &song_id).await?;

    let total_duration = aggregate::total_duration(&rows);
    Ok(Json(SongAnalyticsResponse {
        song_id,
        period: period_str,
        play_count: rows.len(),
        unique_listeners: aggregate::unique_listeners(&rows),
        average_duration: aggregate::average(total_duration, rows.len() as i64),
        total_duration,
        period_plays: rows.len(),
        total_plays: counters.as_ref().map(|c| c.total_plays).unwrap_or(0),
        last_played: counters.map(|c| c.last_played),
    }))
}
