//! Trending songs

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::aggregate::{self, TrendingSong};
use crate::error::ApiResult;
use crate::period::Period;
use crate::{db, AppState};

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    pub limit: Option<i64>,
    pub period: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingResponse {
    pub period: String,
    pub trending: Vec<TrendingSong>,
    pub generated_at: String,
}

/// Compute the trending list for a window (shared with recommendations,
/// platform, and dashboard)
pub async fn trending_for(
    state: &AppState,
    period: Period,
    limit: usize,
) -> ApiResult<Vec<TrendingSong>> {
    let rows = db::plays_since(&state.db, period.cutoff(Utc::now())).await?;
    Ok(aggregate::trending(&rows, limit))
}

/// GET /api/analytics/trending?limit=&period=
pub async fn get_trending(
    State(state): State<AppState>,
    Query(query): Query<TrendingQuery>,
) -> ApiResult<Json<TrendingResponse>> {
    let period_str = query.period.unwrap_or_else(|| "24h".to_string());
    let period = Period::parse_or(Some(&period_str), Period::Hours24);
    let limit = query.limit.unwrap_or(20).clamp(1, 100) as usize;

    let trending = trending_for(&state, period, limit).await?;

    Ok(Json(TrendingResponse {
        period: period_str,
        trending,
        generated_at: Utc::now().to_rfc3339(),
    }))
}
