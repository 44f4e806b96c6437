//! Media store: the media library directory plus its metadata table
//!
//! Song objects are plain files under the media root; the `songs` table
//! mirrors one row per file (content type, size, creation time). Object
//! identity is the file name. All paths are validated before touching the
//! filesystem so a request can never escape the media root.

use chrono::Utc;
use msl_common::{Error, Result};
use sqlx::SqlitePool;
use std::path::PathBuf;

/// One song object's metadata row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SongObject {
    pub name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: String,
}

/// Create the metadata table if needed
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            name TEXT PRIMARY KEY,
            content_type TEXT NOT NULL,
            size_bytes INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Filesystem side of the store
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    /// Open the media library, creating the directory on first run
    pub fn open(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Validate an object name: a bare file name, no path components
    pub fn valid_name(name: &str) -> bool {
        !name.is_empty()
            && name.len() < 256
            && !name.starts_with('.')
            && !name.contains(['/', '\\'])
            && !name.contains("..")
    }

    /// Absolute path for a validated object name
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        if !Self::valid_name(name) {
            return Err(Error::InvalidInput(format!("Invalid object name: {}", name)));
        }
        Ok(self.root.join(name))
    }

    /// Write object bytes (overwrites an existing object of the same name)
    pub async fn save(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(name)?;
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    /// Remove the object file; Ok(false) when it was not present
    pub async fn remove(&self, name: &str) -> Result<bool> {
        let path = self.path_for(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Open the object file for streaming
    pub async fn reader(&self, name: &str) -> Result<tokio::fs::File> {
        let path = self.path_for(name)?;
        Ok(tokio::fs::File::open(&path).await?)
    }
}

/// List all song objects, newest first
pub async fn list_songs(pool: &SqlitePool) -> Result<Vec<SongObject>> {
    let songs = sqlx::query_as::<_, SongObject>(
        "SELECT name, content_type, size_bytes, created_at FROM songs ORDER BY created_at DESC, name ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(songs)
}

/// Fetch one song object by name
pub async fn get_song(pool: &SqlitePool, name: &str) -> Result<Option<SongObject>> {
    let song = sqlx::query_as::<_, SongObject>(
        "SELECT name, content_type, size_bytes, created_at FROM songs WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(song)
}

/// Insert or replace a song object's metadata
pub async fn upsert_song(
    pool: &SqlitePool,
    name: &str,
    content_type: &str,
    size_bytes: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO songs (name, content_type, size_bytes, created_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(name) DO UPDATE SET
            content_type = excluded.content_type,
            size_bytes = excluded.size_bytes
        "#,
    )
    .bind(name)
    .bind(content_type)
    .bind(size_bytes)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete a song object's metadata; Ok(false) when no row matched
pub async fn delete_song(pool: &SqlitePool, name: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM songs WHERE name = ?")
        .bind(name)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_name_validation() {
        assert!(MediaStore::valid_name("track.mp3"));
        assert!(MediaStore::valid_name("My Song (live).flac"));
        assert!(!MediaStore::valid_name(""));
        assert!(!MediaStore::valid_name("../etc/passwd"));
        assert!(!MediaStore::valid_name("a/b.mp3"));
        assert!(!MediaStore::valid_name("a\\b.mp3"));
        assert!(!MediaStore::valid_name(".hidden"));
    }

    #[tokio::test]
    async fn save_and_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::open(dir.path().join("media")).unwrap();

        store.save("t.mp3", b"bytes").await.unwrap();
        assert!(dir.path().join("media/t.mp3").exists());

        assert!(store.remove("t.mp3").await.unwrap());
        assert!(!store.remove("t.mp3").await.unwrap());
    }

    #[tokio::test]
    async fn metadata_upsert_and_delete() {
        let pool = msl_common::db::init_memory_pool().await.unwrap();
        init_schema(&pool).await.unwrap();

        upsert_song(&pool, "t.mp3", "audio/mpeg", 5).await.unwrap();
        upsert_song(&pool, "t.mp3", "audio/mpeg", 9).await.unwrap();

        let song = get_song(&pool, "t.mp3").await.unwrap().unwrap();
        assert_eq!(song.size_bytes, 9);
        assert_eq!(list_songs(&pool).await.unwrap().len(), 1);

        assert!(delete_song(&pool, "t.mp3").await.unwrap());
        assert!(!delete_song(&pool, "t.mp3").await.unwrap());
    }
}
