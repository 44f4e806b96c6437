//! Engagement recording

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::db::EngagementKind;
use crate::error::{ApiError, ApiResult};
use crate::{db, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEngagementRequest {
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub target_id: Option<String>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct RecordEngagementResponse {
    pub success: bool,
    pub message: String,
}

/// POST /api/analytics/engagement
///
/// Accepted types: like, share, download, playlist_add, search. The
/// event insert is the operation; counter bumps are best-effort.
pub async fn record_engagement(
    State(state): State<AppState>,
    Json(request): Json<RecordEngagementRequest>,
) -> ApiResult<(StatusCode, Json<RecordEngagementResponse>)> {
    let (Some(user_id), Some(kind_str)) = (
        request.user_id.filter(|u| !u.is_empty()),
        request.kind.filter(|t| !t.is_empty()),
    ) else {
        return Err(ApiError::BadRequest(
            "userId and type are required".to_string(),
        ));
    };

    let kind: EngagementKind = kind_str
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Unknown engagement type: {}", kind_str)))?;

    let metadata = request
        .metadata
        .unwrap_or_else(|| Value::Object(Default::default()))
        .to_string();

    let id = Uuid::new_v4().to_string();
    db::insert_engagement(
        &state.db,
        &id,
        &user_id,
        kind,
        request.target_id.as_deref(),
        &metadata,
    )
    .await?;

    // Best-effort counter updates
    if let Err(err) =
        db::bump_engagement_analytics(&state.db, kind, request.target_id.as_deref()).await
    {
        warn!("Failed to update engagement analytics: {}", err);
    }
    if let Err(err) = db::bump_user_engagement_profile(&state.db, &user_id, kind).await {
        warn!("Failed to update engagement profile for {}: {}", user_id, err);
    }

    Ok((
        StatusCode::CREATED,
        Json(RecordEngagementResponse {
            success: true,
            message: "Engagement recorded successfully".to_string(),
        }),
    ))
}
