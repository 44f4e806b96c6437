//! Database schema and queries for msl-user
//!
//! All tables are created idempotently on startup. Foreign keys cascade:
//! deleting a user removes their playlists, favorites, and history;
//! deleting a playlist removes its song links.

pub mod models;

use chrono::Utc;
use msl_common::Result;
use sqlx::SqlitePool;

use models::{FavoriteRow, HistoryRow, PlaylistRow, PlaylistSongRow, UserRow};

/// Create all tables and indexes if needed
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            name TEXT NOT NULL,
            avatar_url TEXT,
            preferences TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS playlists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            description TEXT,
            cover_url TEXT,
            is_public INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS playlist_songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            playlist_id INTEGER NOT NULL REFERENCES playlists(id) ON DELETE CASCADE,
            song_id TEXT NOT NULL,
            position INTEGER NOT NULL DEFAULT 0,
            added_at TEXT NOT NULL,
            UNIQUE(playlist_id, song_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_favorites (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            song_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE(user_id, song_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            song_id TEXT NOT NULL,
            played_at TEXT NOT NULL,
            play_duration INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    for index in [
        "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)",
        "CREATE INDEX IF NOT EXISTS idx_playlists_user_id ON playlists(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_playlist_songs_playlist_id ON playlist_songs(playlist_id)",
        "CREATE INDEX IF NOT EXISTS idx_user_favorites_user_id ON user_favorites(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_user_history_user_id ON user_history(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_user_history_played_at ON user_history(played_at DESC)",
    ] {
        sqlx::query(index).execute(pool).await?;
    }

    Ok(())
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

// ========================================
// Users
// ========================================

/// Insert a user; returns the new row
pub async fn create_user(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
    name: &str,
) -> Result<UserRow> {
    let stamp = now();
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (email, password_hash, name, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .bind(&stamp)
    .bind(&stamp)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<UserRow>> {
    let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<UserRow>> {
    let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Update profile fields; absent fields keep their current values
pub async fn update_profile(
    pool: &SqlitePool,
    user_id: i64,
    name: Option<&str>,
    avatar_url: Option<&str>,
    preferences: Option<&str>,
) -> Result<Option<UserRow>> {
    sqlx::query(
        r#"
        UPDATE users SET
            name = COALESCE(?, name),
            avatar_url = COALESCE(?, avatar_url),
            preferences = COALESCE(?, preferences),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(name)
    .bind(avatar_url)
    .bind(preferences)
    .bind(now())
    .bind(user_id)
    .execute(pool)
    .await?;

    find_user_by_id(pool, user_id).await
}

pub async fn update_password(pool: &SqlitePool, user_id: i64, password_hash: &str) -> Result<()> {
    sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
        .bind(password_hash)
        .bind(now())
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

// ========================================
// Playlists
// ========================================

pub async fn create_playlist(
    pool: &SqlitePool,
    user_id: i64,
    name: &str,
    description: Option<&str>,
) -> Result<PlaylistRow> {
    let stamp = now();
    let row = sqlx::query_as::<_, PlaylistRow>(
        r#"
        INSERT INTO playlists (user_id, name, description, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(description)
    .bind(&stamp)
    .bind(&stamp)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn list_playlists(pool: &SqlitePool, user_id: i64) -> Result<Vec<PlaylistRow>> {
    let rows = sqlx::query_as::<_, PlaylistRow>(
        "SELECT * FROM playlists WHERE user_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch one playlist owned by `user_id`
pub async fn get_playlist(
    pool: &SqlitePool,
    user_id: i64,
    playlist_id: i64,
) -> Result<Option<PlaylistRow>> {
    let row =
        sqlx::query_as::<_, PlaylistRow>("SELECT * FROM playlists WHERE id = ? AND user_id = ?")
            .bind(playlist_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(row)
}

pub async fn update_playlist(
    pool: &SqlitePool,
    user_id: i64,
    playlist_id: i64,
    name: Option<&str>,
    description: Option<&str>,
    is_public: Option<bool>,
) -> Result<Option<PlaylistRow>> {
    sqlx::query(
        r#"
        UPDATE playlists SET
            name = COALESCE(?, name),
            description = COALESCE(?, description),
            is_public = COALESCE(?, is_public),
            updated_at = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(is_public)
    .bind(now())
    .bind(playlist_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    get_playlist(pool, user_id, playlist_id).await
}

/// Delete a playlist owned by `user_id`; Ok(false) when no row matched
pub async fn delete_playlist(pool: &SqlitePool, user_id: i64, playlist_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM playlists WHERE id = ? AND user_id = ?")
        .bind(playlist_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Add a song to a playlist. Err carries the unique violation when the
/// song is already present (caller maps it to 409).
pub async fn add_playlist_song(
    pool: &SqlitePool,
    playlist_id: i64,
    song_id: &str,
    position: i64,
) -> std::result::Result<PlaylistSongRow, sqlx::Error> {
    sqlx::query_as::<_, PlaylistSongRow>(
        r#"
        INSERT INTO playlist_songs (playlist_id, song_id, position, added_at)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(playlist_id)
    .bind(song_id)
    .bind(position)
    .bind(now())
    .fetch_one(pool)
    .await
}

pub async fn remove_playlist_song(
    pool: &SqlitePool,
    playlist_id: i64,
    song_id: &str,
) -> Result<bool> {
    let result = sqlx::query("DELETE FROM playlist_songs WHERE playlist_id = ? AND song_id = ?")
        .bind(playlist_id)
        .bind(song_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_playlist_songs(
    pool: &SqlitePool,
    playlist_id: i64,
) -> Result<Vec<PlaylistSongRow>> {
    let rows = sqlx::query_as::<_, PlaylistSongRow>(
        "SELECT * FROM playlist_songs WHERE playlist_id = ? ORDER BY position ASC, added_at ASC",
    )
    .bind(playlist_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ========================================
// Favorites
// ========================================

/// Idempotent: favoriting the same song twice is a no-op
pub async fn add_favorite(pool: &SqlitePool, user_id: i64, song_id: &str) -> Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO user_favorites (user_id, song_id, created_at) VALUES (?, ?, ?)",
    )
    .bind(user_id)
    .bind(song_id)
    .bind(now())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn remove_favorite(pool: &SqlitePool, user_id: i64, song_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM user_favorites WHERE user_id = ? AND song_id = ?")
        .bind(user_id)
        .bind(song_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_favorites(pool: &SqlitePool, user_id: i64) -> Result<Vec<FavoriteRow>> {
    let rows = sqlx::query_as::<_, FavoriteRow>(
        "SELECT * FROM user_favorites WHERE user_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ========================================
// History
// ========================================

pub async fn add_history(
    pool: &SqlitePool,
    user_id: i64,
    song_id: &str,
    play_duration: i64,
) -> Result<HistoryRow> {
    let row = sqlx::query_as::<_, HistoryRow>(
        r#"
        INSERT INTO user_history (user_id, song_id, played_at, play_duration)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(song_id)
    .bind(now())
    .bind(play_duration)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn list_history(
    pool: &SqlitePool,
    user_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<HistoryRow>> {
    let rows = sqlx::query_as::<_, HistoryRow>(
        "SELECT * FROM user_history WHERE user_id = ? ORDER BY played_at DESC, id DESC LIMIT ? OFFSET ?",
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count_history(pool: &SqlitePool, user_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_history WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        let pool = msl_common::db::init_memory_pool().await.unwrap();
        init_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn user_round_trip() {
        let pool = test_pool().await;
        let user = create_user(&pool, "a@b.com", "hash", "Ada").await.unwrap();
        assert_eq!(user.email, "a@b.com");
        assert_eq!(user.preferences, "{}");

        let found = find_user_by_email(&pool, "a@b.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(find_user_by_email(&pool, "x@y.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_by_unique_index() {
        let pool = test_pool().await;
        create_user(&pool, "a@b.com", "hash", "Ada").await.unwrap();
        assert!(create_user(&pool, "a@b.com", "hash", "Ada").await.is_err());
    }

    #[tokio::test]
    async fn deleting_user_cascades() {
        let pool = test_pool().await;
        let user = create_user(&pool, "a@b.com", "hash", "Ada").await.unwrap();
        let playlist = create_playlist(&pool, user.id, "Mix", None).await.unwrap();
        add_playlist_song(&pool, playlist.id, "s1.mp3", 0).await.unwrap();
        add_favorite(&pool, user.id, "s1.mp3").await.unwrap();
        add_history(&pool, user.id, "s1.mp3", 30).await.unwrap();

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user.id)
            .execute(&pool)
            .await
            .unwrap();

        assert!(list_playlists(&pool, user.id).await.unwrap().is_empty());
        assert!(list_playlist_songs(&pool, playlist.id).await.unwrap().is_empty());
        assert!(list_favorites(&pool, user.id).await.unwrap().is_empty());
        assert_eq!(count_history(&pool, user.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn favorites_are_idempotent() {
        let pool = test_pool().await;
        let user = create_user(&pool, "a@b.com", "hash", "Ada").await.unwrap();
        add_favorite(&pool, user.id, "s1.mp3").await.unwrap();
        add_favorite(&pool, user.id, "s1.mp3").await.unwrap();
        assert_eq!(list_favorites(&pool, user.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn playlist_song_duplicate_is_unique_violation() {
        let pool = test_pool().await;
        let user = create_user(&pool, "a@b.com", "hash", "Ada").await.unwrap();
        let playlist = create_playlist(&pool, user.id, "Mix", None).await.unwrap();
        add_playlist_song(&pool, playlist.id, "s1.mp3", 0).await.unwrap();

        let err = add_playlist_song(&pool, playlist.id, "s1.mp3", 1)
            .await
            .unwrap_err();
        let is_unique = err
            .as_database_error()
            .map(|d| d.is_unique_violation())
            .unwrap_or(false);
        assert!(is_unique);
    }
}
