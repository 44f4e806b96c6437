//! Database schema and queries for msl-analytics
//!
//! `song_plays` and `user_engagement` are append-only event tables; the
//! remaining tables are denormalized counters. Every counter bump is a
//! single `INSERT .. ON CONFLICT DO UPDATE` statement, so concurrent
//! writers never lose an update.

use chrono::{DateTime, SecondsFormat, Utc};
use msl_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use std::str::FromStr;

/// Stored timestamp format: fixed-width RFC 3339 UTC, so the TEXT
/// column's lexicographic order is chronological order
pub fn stamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// One play event (wire shape matches the stored event)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PlayRow {
    pub id: String,
    pub song_id: String,
    pub user_id: String,
    pub duration: i64,
    pub timestamp: String,
    pub created_at: String,
}

/// Lifetime counters for one song
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SongAnalyticsRow {
    pub song_id: String,
    pub total_plays: i64,
    pub unique_listeners: i64,
    pub last_played: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Engagement interaction kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementKind {
    Like,
    Share,
    Download,
    PlaylistAdd,
    Search,
}

impl FromStr for EngagementKind {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "like" => Ok(EngagementKind::Like),
            "share" => Ok(EngagementKind::Share),
            "download" => Ok(EngagementKind::Download),
            "playlist_add" => Ok(EngagementKind::PlaylistAdd),
            "search" => Ok(EngagementKind::Search),
            _ => Err(()),
        }
    }
}

impl EngagementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngagementKind::Like => "like",
            EngagementKind::Share => "share",
            EngagementKind::Download => "download",
            EngagementKind::PlaylistAdd => "playlist_add",
            EngagementKind::Search => "search",
        }
    }

    /// Counter column in user_engagement_profiles
    fn profile_column(&self) -> &'static str {
        match self {
            EngagementKind::Like => "likes",
            EngagementKind::Share => "shares",
            EngagementKind::Download => "downloads",
            EngagementKind::PlaylistAdd => "playlist_adds",
            EngagementKind::Search => "searches",
        }
    }
}

/// Create all tables and indexes if needed
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS song_plays (
            id TEXT PRIMARY KEY,
            song_id TEXT NOT NULL,
            user_id TEXT NOT NULL DEFAULT 'anonymous',
            duration INTEGER NOT NULL DEFAULT 0,
            timestamp TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS song_analytics (
            song_id TEXT PRIMARY KEY,
            total_plays INTEGER NOT NULL DEFAULT 0,
            unique_listeners INTEGER NOT NULL DEFAULT 1,
            last_played TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_analytics (
            user_id TEXT PRIMARY KEY,
            total_songs_played INTEGER NOT NULL DEFAULT 0,
            last_active TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_engagement (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            kind TEXT NOT NULL,
            target_id TEXT,
            metadata TEXT NOT NULL DEFAULT '{}',
            timestamp TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS engagement_analytics (
            kind TEXT NOT NULL,
            target_id TEXT NOT NULL DEFAULT '',
            count INTEGER NOT NULL DEFAULT 0,
            last_engaged TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (kind, target_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_engagement_profiles (
            user_id TEXT PRIMARY KEY,
            likes INTEGER NOT NULL DEFAULT 0,
            shares INTEGER NOT NULL DEFAULT 0,
            downloads INTEGER NOT NULL DEFAULT 0,
            playlist_adds INTEGER NOT NULL DEFAULT 0,
            searches INTEGER NOT NULL DEFAULT 0,
            last_engagement TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    for index in [
        "CREATE INDEX IF NOT EXISTS idx_song_plays_song_id ON song_plays(song_id, timestamp)",
        "CREATE INDEX IF NOT EXISTS idx_song_plays_user_id ON song_plays(user_id, timestamp)",
        "CREATE INDEX IF NOT EXISTS idx_song_plays_timestamp ON song_plays(timestamp DESC)",
        "CREATE INDEX IF NOT EXISTS idx_user_engagement_user_id ON user_engagement(user_id, timestamp)",
    ] {
        sqlx::query(index).execute(pool).await?;
    }

    Ok(())
}

// ========================================
// Play events
// ========================================

/// Append one play event
pub async fn insert_play(
    pool: &SqlitePool,
    id: &str,
    song_id: &str,
    user_id: &str,
    duration: i64,
    timestamp: &DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO song_plays (id, song_id, user_id, duration, timestamp, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(song_id)
    .bind(user_id)
    .bind(duration)
    .bind(stamp(timestamp))
    .bind(stamp(&Utc::now()))
    .execute(pool)
    .await?;
    Ok(())
}

/// Plays within the window (None = all time), for one song
pub async fn plays_for_song_since(
    pool: &SqlitePool,
    song_id: &str,
    cutoff: Option<DateTime<Utc>>,
) -> Result<Vec<PlayRow>> {
    let rows = match cutoff {
        Some(cutoff) => {
            sqlx::query_as::<_, PlayRow>(
                "SELECT * FROM song_plays WHERE song_id = ? AND timestamp >= ?",
            )
            .bind(song_id)
            .bind(stamp(&cutoff))
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, PlayRow>("SELECT * FROM song_plays WHERE song_id = ?")
                .bind(song_id)
                .fetch_all(pool)
                .await?
        }
    };
    Ok(rows)
}

/// Plays within the window (None = all time), across all songs
pub async fn plays_since(
    pool: &SqlitePool,
    cutoff: Option<DateTime<Utc>>,
) -> Result<Vec<PlayRow>> {
    let rows = match cutoff {
        Some(cutoff) => {
            sqlx::query_as::<_, PlayRow>("SELECT * FROM song_plays WHERE timestamp >= ?")
                .bind(stamp(&cutoff))
                .fetch_all(pool)
                .await?
        }
        None => {
            sqlx::query_as::<_, PlayRow>("SELECT * FROM song_plays")
                .fetch_all(pool)
                .await?
        }
    };
    Ok(rows)
}

/// One user's plays within the window (None = all time)
pub async fn plays_for_user_since(
    pool: &SqlitePool,
    user_id: &str,
    cutoff: Option<DateTime<Utc>>,
) -> Result<Vec<PlayRow>> {
    let rows = match cutoff {
        Some(cutoff) => {
            sqlx::query_as::<_, PlayRow>(
                "SELECT * FROM song_plays WHERE user_id = ? AND timestamp >= ?",
            )
            .bind(user_id)
            .bind(stamp(&cutoff))
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, PlayRow>("SELECT * FROM song_plays WHERE user_id = ?")
                .bind(user_id)
                .fetch_all(pool)
                .await?
        }
    };
    Ok(rows)
}

/// One user's plays, newest first, paginated
pub async fn plays_for_user_page(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<PlayRow>> {
    let rows = sqlx::query_as::<_, PlayRow>(
        "SELECT * FROM song_plays WHERE user_id = ? ORDER BY timestamp DESC, id DESC LIMIT ? OFFSET ?",
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count_plays_for_user(pool: &SqlitePool, user_id: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM song_plays WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Latest plays across all users
pub async fn recent_plays(pool: &SqlitePool, limit: i64) -> Result<Vec<PlayRow>> {
    let rows = sqlx::query_as::<_, PlayRow>(
        "SELECT * FROM song_plays ORDER BY timestamp DESC, id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ========================================
// Denormalized counters (atomic upserts)
// ========================================

/// Bump a song's lifetime play counter
pub async fn bump_song_analytics(pool: &SqlitePool, song_id: &str) -> Result<()> {
    let now_stamp = stamp(&Utc::now());
    sqlx::query(
        r#"
        INSERT INTO song_analytics
            (song_id, total_plays, unique_listeners, last_played, created_at, updated_at)
        VALUES (?, 1, 1, ?, ?, ?)
        ON CONFLICT(song_id) DO UPDATE SET
            total_plays = total_plays + 1,
            last_played = excluded.last_played,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(song_id)
    .bind(&now_stamp)
    .bind(&now_stamp)
    .bind(&now_stamp)
    .execute(pool)
    .await?;
    Ok(())
}

/// Bump a user's lifetime play counter
pub async fn bump_user_analytics(pool: &SqlitePool, user_id: &str) -> Result<()> {
    let now_stamp = stamp(&Utc::now());
    sqlx::query(
        r#"
        INSERT INTO user_analytics (user_id, total_songs_played, last_active, updated_at)
        VALUES (?, 1, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            total_songs_played = total_songs_played + 1,
            last_active = excluded.last_active,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(user_id)
    .bind(&now_stamp)
    .bind(&now_stamp)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_song_analytics(
    pool: &SqlitePool,
    song_id: &str,
) -> Result<Option<SongAnalyticsRow>> {
    let row = sqlx::query_as::<_, SongAnalyticsRow>(
        "SELECT * FROM song_analytics WHERE song_id = ?",
    )
    .bind(song_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

// ========================================
// Engagement
// ========================================

/// Append one engagement event
pub async fn insert_engagement(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    kind: EngagementKind,
    target_id: Option<&str>,
    metadata: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO user_engagement (id, user_id, kind, target_id, metadata, timestamp)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(kind.as_str())
    .bind(target_id)
    .bind(metadata)
    .bind(stamp(&Utc::now()))
    .execute(pool)
    .await?;
    Ok(())
}

/// Bump the per-target engagement counter
pub async fn bump_engagement_analytics(
    pool: &SqlitePool,
    kind: EngagementKind,
    target_id: Option<&str>,
) -> Result<()> {
    let now_stamp = stamp(&Utc::now());
    sqlx::query(
        r#"
        INSERT INTO engagement_analytics (kind, target_id, count, last_engaged, updated_at)
        VALUES (?, ?, 1, ?, ?)
        ON CONFLICT(kind, target_id) DO UPDATE SET
            count = count + 1,
            last_engaged = excluded.last_engaged,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(kind.as_str())
    .bind(target_id.unwrap_or(""))
    .bind(&now_stamp)
    .bind(&now_stamp)
    .execute(pool)
    .await?;
    Ok(())
}

/// Bump one kind's counter in the user's engagement profile
pub async fn bump_user_engagement_profile(
    pool: &SqlitePool,
    user_id: &str,
    kind: EngagementKind,
) -> Result<()> {
    let now_stamp = stamp(&Utc::now());
    // Column name comes from the fixed kind set, never from user input
    let column = kind.profile_column();
    let sql = format!(
        r#"
        INSERT INTO user_engagement_profiles (user_id, {column}, last_engagement, updated_at)
        VALUES (?, 1, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            {column} = {column} + 1,
            last_engagement = excluded.last_engagement,
            updated_at = excluded.updated_at
        "#
    );
    sqlx::query(&sql)
        .bind(user_id)
        .bind(&now_stamp)
        .bind(&now_stamp)
        .execute(pool)
        .await?;
    Ok(())
}

/// Engagement kinds recorded by one user within the window
pub async fn engagement_kinds_for_user_since(
    pool: &SqlitePool,
    user_id: &str,
    cutoff: Option<DateTime<Utc>>,
) -> Result<Vec<String>> {
    let rows: Vec<(String,)> = match cutoff {
        Some(cutoff) => {
            sqlx::query_as("SELECT kind FROM user_engagement WHERE user_id = ? AND timestamp >= ?")
                .bind(user_id)
                .bind(stamp(&cutoff))
                .fetch_all(pool)
                .await?
        }
        None => {
            sqlx::query_as("SELECT kind FROM user_engagement WHERE user_id = ?")
                .bind(user_id)
                .fetch_all(pool)
                .await?
        }
    };
    Ok(rows.into_iter().map(|(kind,)| kind).collect())
}
