//! Per-user analytics: history, recommendations, insights

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::aggregate::{self, TimeOfDay, TopSong, TrendingSong};
use crate::api::trending::trending_for;
use crate::db::PlayRow;
use crate::error::ApiResult;
use crate::period::Period;
use crate::{db, AppState};

// ========================================
// History
// ========================================

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
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub user_id: String,
    pub history: Vec<PlayRow>,
    pub pagination: Pagination,
}

/// GET /api/analytics/users/:user_id/history?limit=&offset=
pub async fn get_user_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<HistoryResponse>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    let offset = query.offset.unwrap_or(0).max(0);

    let history = db::plays_for_user_page(&state.db, &user_id, limit, offset).await?;
    let total = db::count_plays_for_user(&state.db, &user_id).await?;

    Ok(Json(HistoryResponse {
        user_id,
        history,
        pagination: Pagination {
            total,
            limit,
            offset,
        },
    }))
}

// ========================================
// Recommendations
// ========================================

#[derive(Debug, Deserialize)]
pub struct RecommendationsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    pub user_id: String,
    pub recommendations: Vec<TrendingSong>,
    pub generated_at: String,
}

/// GET /api/analytics/users/:user_id/recommendations?limit=
///
/// Trending over the last 7 days minus the songs the user already
/// played; a user with no history gets the plain trending list.
pub async fn get_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<RecommendationsQuery>,
) -> ApiResult<Json<RecommendationsResponse>> {
    let limit = query.limit.unwrap_or(10).clamp(1, 100) as usize;

    let user_plays = db::plays_for_user_since(&state.db, &user_id, None).await?;
    let recommendations = if user_plays.is_empty() {
        trending_for(&state, Period::Days7, limit).await?
    } else {
        let played: HashSet<&str> = user_plays.iter().map(|p| p.song_id.as_str()).collect();
        // Over-fetch so filtering can't empty the list prematurely
        let mut trending = trending_for(&state, Period::Days7, limit * 2).await?;
        trending.retain(|song| !played.contains(song.song_id.as_str()));
        trending.truncate(limit);
        trending
    };

    Ok(Json(RecommendationsResponse {
        user_id,
        recommendations,
        generated_at: Utc::now().to_rfc3339(),
    }))
}

// ========================================
// Insights
// ========================================

#[derive(Debug, Deserialize)]
pub struct InsightsQuery {
    pub period: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListeningPatterns {
    pub time_of_day: TimeOfDay,
    pub favorite_time: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsResponse {
    pub user_id: String,
    pub period: String,
    pub total_plays: usize,
    pub total_play_time: i64,
    pub average_play_time: i64,
    pub top_songs: Vec<TopSong>,
    pub listening_patterns: ListeningPatterns,
    pub engagement: BTreeMap<String, i64>,
    pub activity_level: String,
    pub generated_at: String,
}

/// GET /api/analytics/users/:user_id/insights?period=
///
/// Accepted windows: 7d, 30d, 90d; default and unknown-value fallback is
/// 30d.
pub async fn get_user_insights(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<InsightsQuery>,
) -> ApiResult<Json<InsightsResponse>> {
    let period_str = query.period.unwrap_or_else(|| "30d".to_string());
    let period = match Period::parse(&period_str) {
        Some(p @ (Period::Days7 | Period::Days30 | Period::Days90)) => p,
        _ => Period::Days30,
    };
    let cutoff = period.cutoff(Utc::now());

    let plays = db::plays_for_user_since(&state.db, &user_id, cutoff).await?;
    let engagement_kinds =
        db::engagement_kinds_for_user_since(&state.db, &user_id, cutoff).await?;

    let total_play_time = aggregate::total_duration(&plays);
    let buckets = aggregate::time_of_day(&plays);
    let favorite_time = buckets.favorite().to_string();

    Ok(Json(InsightsResponse {
        user_id,
        period: period_str,
        total_plays: plays.len(),
        total_play_time,
        average_play_time: aggregate::average(total_play_time, plays.len() as i64),
        top_songs: aggregate::top_songs(&plays, 10),
        listening_patterns: ListeningPatterns {
            time_of_day: buckets,
            favorite_time,
        },
        engagement: aggregate::engagement_by_kind(&engagement_kinds),
        activity_level: aggregate::activity_level(plays.len()).to_string(),
        generated_at: Utc::now().to_rfc3339(),
    }))
}
