//! Combined dashboard view

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::aggregate::TrendingSong;
use crate::api::platform::{platform_for, PlatformData};
use crate::api::trending::trending_for;
use crate::db::PlayRow;
use crate::error::ApiResult;
use crate::period::Period;
use crate::{db, AppState};

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub period: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub period: String,
    pub platform: PlatformData,
    pub trending: Vec<TrendingSong>,
    pub recent_activity: Vec<PlayRow>,
    pub generated_at: String,
}

/// GET /api/analytics/dashboard?period=
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<DashboardResponse>> {
    let period_str = query.period.unwrap_or_else(|| "7d".to_string());
    let period = Period::parse_or(Some(&period_str), Period::Days7);

    let platform = platform_for(&state, period).await?;
    let trending = trending_for(&state, period, 10).await?;
    let recent_activity = db::recent_plays(&state.db, 20).await?;

    Ok(Json(DashboardResponse {
        period: period_str,
        platform,
        trending,
        recent_activity,
        generated_at: Utc::now().to_rfc3339(),
    }))
}
