//! Profile endpoints

use axum::extract::State;
use axum::{Extension, Json};
use msl_common::api::auth::Claims;
use serde::Deserialize;
use serde_json::Value;

use crate::db::models::Profile;
use crate::error::{ApiError, ApiResult};
use crate::validate::is_valid_password;
use crate::{db, password, AppState};

/// GET /api/users/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Profile>> {
    let user = db::find_user_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(user.profile()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub preferences: Option<Value>,
}

/// PUT /api/users/profile
///
/// Absent fields are left unchanged.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<Json<Profile>> {
    if let Some(name) = &request.name {
        if name.trim().is_empty() {
            return Err(ApiError::BadRequest("Name must not be empty".to_string()));
        }
    }

    let preferences = match &request.preferences {
        Some(value) if !value.is_object() => {
            return Err(ApiError::BadRequest(
                "preferences must be a JSON object".to_string(),
            ));
        }
        Some(value) => Some(value.to_string()),
        None => None,
    };

    let user = db::update_profile(
        &state.db,
        claims.sub,
        request.name.as_deref().map(str::trim),
        request.avatar_url.as_deref(),
        preferences.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.profile()))
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// PUT /api/users/password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<ChangePasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let (Some(current), Some(new)) = (request.current_password, request.new_password) else {
        return Err(ApiError::BadRequest(
            "current_password and new_password are required".to_string(),
        ));
    };

    let user = db::find_user_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !password::verify(&current, &user.password_hash)? {
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }
    if !is_valid_password(&new) {
        return Err(ApiError::BadRequest(
            "Password must be at least 8 characters and contain a letter and a number".to_string(),
        ));
    }

    let hash = password::hash(&new)?;
    db::update_password(&state.db, user.id, &hash).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Password updated successfully",
    })))
}
