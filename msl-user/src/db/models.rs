//! Row types and API-facing shapes for msl-user

use serde::Serialize;
use serde_json::Value;

/// users table row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub preferences: String,
    pub created_at: String,
    pub updated_at: String,
}

impl UserRow {
    /// Public identity returned by register/login
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }

    /// Full profile (password hash never leaves the service)
    pub fn profile(&self) -> Profile {
        Profile {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            avatar_url: self.avatar_url.clone(),
            preferences: serde_json::from_str(&self.preferences)
                .unwrap_or_else(|_| Value::Object(Default::default())),
            created_at: self.created_at.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub preferences: Value,
    pub created_at: String,
}

/// playlists table row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PlaylistRow {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub is_public: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// playlist_songs table row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PlaylistSongRow {
    pub id: i64,
    pub playlist_id: i64,
    pub song_id: String,
    pub position: i64,
    pub added_at: String,
}

/// user_favorites table row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FavoriteRow {
    pub id: i64,
    pub user_id: i64,
    pub song_id: String,
    pub created_at: String,
}

/// user_history table row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct HistoryRow {
    pub id: i64,
    pub user_id: i64,
    pub song_id: String,
    pub played_at: String,
    pub play_duration: i64,
}
