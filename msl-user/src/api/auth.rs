//! Registration and login

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use msl_common::api::auth::issue_token;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::models::PublicUser;
use crate::error::{ApiError, ApiResult};
use crate::validate::{is_valid_email, is_valid_password};
use crate::{db, password, AppState};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let (Some(email), Some(plain), Some(name)) = (request.email, request.password, request.name)
    else {
        return Err(ApiError::BadRequest(
            "email, password, and name are required".to_string(),
        ));
    };

    if !is_valid_email(&email) {
        return Err(ApiError::BadRequest("Invalid email address".to_string()));
    }
    if !is_valid_password(&plain) {
        return Err(ApiError::BadRequest(
            "Password must be at least 8 characters and contain a letter and a number".to_string(),
        ));
    }
    if name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name must not be empty".to_string()));
    }

    if db::find_user_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::BadRequest("User already exists".to_string()));
    }

    let hash = password::hash(&plain)?;
    let user = db::create_user(&state.db, &email, &hash, name.trim()).await?;
    let token = issue_token(user.id, &user.email, &state.jwt_secret)?;
    info!("Registered user {} ({})", user.id, user.email);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.public(),
            token,
        }),
    ))
}

/// POST /api/auth/login
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (Some(email), Some(plain)) = (request.email, request.password) else {
        return Err(ApiError::BadRequest(
            "email and password are required".to_string(),
        ));
    };

    let Some(user) = db::find_user_by_email(&state.db, &email).await? else {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    };

    if !password::verify(&plain, &user.password_hash)? {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = issue_token(user.id, &user.email, &state.jwt_secret)?;

    Ok(Json(AuthResponse {
        user: user.public(),
        token,
    }))
}
