//! Song catalog API: list, get, upload, delete
//!
//! Responses keep the envelope the frontend consumes: `{success, data,
//! count}` for lists, `{success, data}` for single objects. Artist,
//! play-count, and duration fields are placeholders the catalog does not
//! track; they stay in the shape at fixed values.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::store::{self, MediaStore, SongObject};
use crate::AppState;

/// One song as the frontend expects it
#[derive(Debug, Clone, Serialize)]
pub struct Song {
    pub id: String,
    pub title: String,
    pub url: String,
    pub artist_name: String,
    pub plays: i64,
    pub duration: String,
}

impl Song {
    fn from_object(object: &SongObject, base_url: &str) -> Self {
        Self {
            id: object.name.clone(),
            title: strip_extension(&object.name).to_string(),
            url: public_media_url(base_url, &object.name),
            artist_name: "Unknown Artist".to_string(),
            plays: 0,
            duration: "0:00".to_string(),
        }
    }
}

/// Public (unsigned) URL of a media object
pub fn public_media_url(base_url: &str, name: &str) -> String {
    format!("{}/media/{}", base_url, urlencoding::encode(name))
}

/// Object name minus its last extension
fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

#[derive(Debug, Serialize)]
pub struct SongListResponse {
    pub success: bool,
    pub data: Vec<Song>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct SongResponse {
    pub success: bool,
    pub data: Song,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub data: UploadedSong,
}

#[derive(Debug, Serialize)]
pub struct UploadedSong {
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub content_type: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// GET /api/songs
pub async fn list_songs(State(state): State<AppState>) -> ApiResult<Json<SongListResponse>> {
    let objects = store::list_songs(&state.db).await?;
    let data: Vec<Song> = objects
        .iter()
        .map(|o| Song::from_object(o, &state.public_base_url))
        .collect();
    let count = data.len();
    Ok(Json(SongListResponse {
        success: true,
        data,
        count,
    }))
}

/// GET /api/songs/:id
pub async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SongResponse>> {
    let object = store::get_song(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Song not found: {}", id)))?;
    Ok(Json(SongResponse {
        success: true,
        data: Song::from_object(&object, &state.public_base_url),
    }))
}

/// POST /api/songs
///
/// Multipart upload. The first part carrying a file name is the song;
/// anything that is not `audio/*` is rejected.
pub async fn upload_song(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };

        if !MediaStore::valid_name(&file_name) {
            return Err(ApiError::BadRequest(format!(
                "Invalid file name: {}",
                file_name
            )));
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        if !content_type.starts_with("audio/") {
            return Err(ApiError::BadRequest(
                "Only audio files are allowed".to_string(),
            ));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;

        state.store.save(&file_name, &bytes).await?;
        store::upsert_song(&state.db, &file_name, &content_type, bytes.len() as i64).await?;
        info!("Uploaded song: {} ({} bytes)", file_name, bytes.len());

        return Ok(Json(UploadResponse {
            success: true,
            message: "Song uploaded successfully".to_string(),
            data: UploadedSong {
                url: public_media_url(&state.public_base_url, &file_name),
                name: file_name,
                content_type,
            },
        }));
    }

    Err(ApiError::BadRequest("No file uploaded".to_string()))
}

/// DELETE /api/songs/:id
pub async fn delete_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let existed = store::delete_song(&state.db, &id).await?;
    if !existed {
        return Err(ApiError::NotFound(format!("Song not found: {}", id)));
    }
    state.store.remove(&id).await?;
    info!("Deleted song: {}", id);

    Ok(Json(DeleteResponse {
        success: true,
        message: "Song deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_stripping() {
        assert_eq!(strip_extension("track.mp3"), "track");
        assert_eq!(strip_extension("a.b.flac"), "a.b");
        assert_eq!(strip_extension("noext"), "noext");
    }

    #[test]
    fn media_urls_are_percent_encoded() {
        let url = public_media_url("http://localhost:3001", "My Song.mp3");
        assert_eq!(url, "http://localhost:3001/media/My%20Song.mp3");
    }
}
