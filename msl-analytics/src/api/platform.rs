//! Platform-wide analytics

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::aggregate::{self, TrendingSong};
use crate::error::ApiResult;
use crate::period::Period;
use crate::{db, AppState};

#[derive(Debug, Deserialize)]
pub struct PlatformQuery {
    pub period: Option<String>,
}

/// Platform aggregates (also embedded in the dashboard response)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformData {
    pub total_plays: usize,
    pub unique_users: usize,
    pub total_duration: i64,
    pub average_session_duration: i64,
    pub popular_songs: Vec<TrendingSong>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformResponse {
    pub period: String,
    #[serde(flatten)]
    pub data: PlatformData,
    pub generated_at: String,
}

/// Compute platform aggregates for a window (shared with the dashboard)
pub async fn platform_for(state: &AppState, period: Period) -> ApiResult<PlatformData> {
    let rows = db::plays_since(&state.db, period.cutoff(Utc::now())).await?;
    let total_duration = aggregate::total_duration(&rows);

    Ok(PlatformData {
        total_plays: rows.len(),
        unique_users: aggregate::unique_listeners(&rows),
        total_duration,
        average_session_duration: aggregate::average(total_duration, rows.len() as i64),
        popular_songs: aggregate::trending(&rows, 5),
    })
}

/// GET /api/analytics/platform?period=
pub async fn get_platform_analytics(
    State(state): State<AppState>,
    Query(query): Query<PlatformQuery>,
) -> ApiResult<Json<PlatformResponse>> {
    let period_str = query.period.unwrap_or_else(|| "7d".to_string());
    let period = Period::parse_or(Some(&period_str), Period::Days7);

    let data = platform_for(&state, period).await?;

    Ok(Json(PlatformResponse {
        period: period_str,
        data,
        generated_at: Utc::now().to_rfc3339(),
    }))
}
