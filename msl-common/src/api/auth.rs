//! Bearer token (JWT) primitives
//!
//! Pure functions only — no HTTP framework dependencies. The user service
//! issues tokens at register/login and its middleware verifies them; the
//! functions live here so any service can verify a token without pulling
//! in the user service.
//!
//! Tokens are HS256 with a 24-hour expiry, signed with the secret the
//! user service resolves at startup.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Token lifetime in seconds (24 hours)
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Token validation/creation errors
#[derive(Debug, Error)]
pub enum TokenError {
    /// No Authorization header, or not a Bearer scheme
    #[error("Authorization token required")]
    Missing,

    /// Signature mismatch, malformed token, or expired
    #[error("Invalid authentication token")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Claims carried by an MSL bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id (users.id in the user service database)
    pub sub: i64,
    /// Email at issue time
    pub email: String,
    /// Expiry, Unix epoch seconds
    pub exp: i64,
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Issue a token for `user_id`, expiring `TOKEN_TTL_SECS` from now
pub fn issue_token(user_id: i64, email: &str, secret: &str) -> Result<String, TokenError> {
    issue_token_at(user_id, email, secret, now_unix())
}

/// Issue a token with an explicit issue time (tests)
pub fn issue_token_at(
    user_id: i64,
    email: &str,
    secret: &str,
    issued_at: i64,
) -> Result<String, TokenError> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: issued_at + TOKEN_TTL_SECS,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

/// Verify a token's signature and expiry, returning its claims
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header_value: &str) -> Result<&str, TokenError> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(TokenError::Missing)
}
