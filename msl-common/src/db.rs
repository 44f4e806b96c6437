//! Database pool initialization
//!
//! Each service owns one SQLite database file. Connect options carry the
//! pragmas every service relies on (foreign keys, WAL, busy timeout), so
//! every pooled connection gets them, not just the first.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Open (creating if needed) the service database at `db_path`
pub async fn init_pool(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    Ok(pool)
}

/// Open an in-memory database (tests). Pool is pinned to a single
/// connection so every query sees the same memory database.
pub async fn init_memory_pool() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .in_memory(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Quick liveness probe used by the /health endpoints
pub async fn probe(pool: &SqlitePool) -> &'static str {
    match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await {
        Ok(_) => "connected",
        Err(_) => "unreachable",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_pool_round_trip() {
        let pool = init_memory_pool().await.unwrap();
        sqlx::query("CREATE TABLE t (x INTEGER)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO t (x) VALUES (42)")
            .execute(&pool)
            .await
            .unwrap();
        let x: i64 = sqlx::query_scalar("SELECT x FROM t")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(x, 42);
    }

    #[tokio::test]
    async fn foreign_keys_enforced() {
        let pool = init_memory_pool().await.unwrap();
        sqlx::query("CREATE TABLE parent (id INTEGER PRIMARY KEY)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "CREATE TABLE child (id INTEGER PRIMARY KEY, parent_id INTEGER NOT NULL REFERENCES parent(id))",
        )
        .execute(&pool)
        .await
        .unwrap();

        let orphan = sqlx::query("INSERT INTO child (parent_id) VALUES (99)")
            .execute(&pool)
            .await;
        assert!(orphan.is_err());
    }

    #[tokio::test]
    async fn probe_reports_connected() {
        let pool = init_memory_pool().await.unwrap();
        assert_eq!(probe(&pool).await, "connected");
    }

    #[tokio::test]
    async fn init_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("svc.db");
        let _pool = init_pool(&path).await.unwrap();
        assert!(path.exists());
    }
}
