//! Signed stream URLs and the verifying media route
//!
//! `GET /api/songs/:id/stream-url` hands out a URL carrying an expiry and
//! an HMAC signature; `GET /media/:name` recomputes the signature before
//! any filesystem access and streams the object bytes on success.

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use msl_common::signing;
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;

use crate::error::{ApiError, ApiResult};
use crate::store::{self, MediaStore};
use crate::AppState;

/// Signed URL lifetime in seconds (24 hours)
pub const STREAM_URL_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Serialize)]
pub struct StreamUrlResponse {
    pub success: bool,
    pub url: String,
    #[serde(rename = "expiresIn")]
    pub expires_in: i64,
    #[serde(rename = "songId")]
    pub song_id: String,
}

/// GET /api/songs/:id/stream-url
pub async fn get_stream_url(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<StreamUrlResponse>> {
    if store::get_song(&state.db, &id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Song not found: {}", id)));
    }

    let expires = Utc::now().timestamp() + STREAM_URL_TTL_SECS;
    let signature = signing::sign(&id, expires, &state.signing_secret);
    let url = format!(
        "{}/media/{}?expires={}&sig={}",
        state.public_base_url,
        urlencoding::encode(&id),
        expires,
        signature
    );

    Ok(Json(StreamUrlResponse {
        success: true,
        url,
        expires_in: STREAM_URL_TTL_SECS,
        song_id: id,
    }))
}

#[derive(Debug, Deserialize)]
pub struct MediaQuery {
    pub expires: i64,
    pub sig: String,
}

/// GET /media/:name?expires=&sig=
pub async fn serve_media(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<MediaQuery>,
) -> ApiResult<Response> {
    if !MediaStore::valid_name(&name) {
        return Err(ApiError::BadRequest(format!("Invalid object name: {}", name)));
    }

    if !signing::verify(&name, query.expires, &query.sig, &state.signing_secret) {
        return Err(ApiError::Forbidden("Invalid signature".to_string()));
    }

    if Utc::now().timestamp() > query.expires {
        return Err(ApiError::Gone("Stream URL has expired".to_string()));
    }

    let object = store::get_song(&state.db, &name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Song not found: {}", name)))?;

    let file = match state.store.reader(&name).await {
        Ok(file) => file,
        Err(msl_common::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound(format!("Song not found: {}", name)));
        }
        Err(e) => return Err(e.into()),
    };

    let stream = ReaderStream::new(file);
    let response = Response::builder()
        .header(header::CONTENT_TYPE, object.content_type)
        .header(header::CONTENT_LENGTH, object.size_bytes)
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(response)
}
