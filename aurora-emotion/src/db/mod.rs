//! Database access for aurora-emotion
//!
//! Single SQLite file in the root folder holding persisted analyses.

pub mod analyses;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
///
/// Creates the parent directory and database file if missing.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create aurora-emotion tables if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS emotion_analyses (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            emotion TEXT NOT NULL,
            intensity REAL NOT NULL,
            confidence REAL NOT NULL,
            reasoning TEXT NOT NULL,
            secondary_emotions TEXT NOT NULL DEFAULT '[]',
            client_timestamp TEXT,
            analyzed_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_emotion_analyses_user_time
            ON emotion_analyses (user_id, analyzed_at)
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (emotion_analyses)");

    Ok(())
}
