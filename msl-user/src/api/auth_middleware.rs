//! Bearer token middleware
//!
//! Verifies the `Authorization: Bearer <jwt>` header and stores the
//! token's claims in request extensions for handlers to read.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use msl_common::api::auth::{bearer_token, verify_token, Claims, TokenError};

use crate::error::ApiError;
use crate::AppState;

/// Verify the bearer token on a protected route
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state.jwt_secret, request.headers()) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(err) => ApiError::Token(err).into_response(),
    }
}

fn authenticate(secret: &str, headers: &HeaderMap) -> Result<Claims, TokenError> {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(TokenError::Missing)?;
    let token = bearer_token(header_value)?;
    verify_token(token, secret)
}
