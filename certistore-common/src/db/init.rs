//! Database initialization
//!
//! Creates the database on first run and the schema idempotently, so the
//! service starts with zero manual setup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// SQLite busy timeout
const BUSY_TIMEOUT_MS: u32 = 5000;

/// Open (creating if needed) the database and ensure all tables exist
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL allows concurrent readers alongside the single writer
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query(&format!("PRAGMA busy_timeout = {}", BUSY_TIMEOUT_MS))
        .execute(&pool)
        .await?;

    create_certificates_table(&pool).await?;
    create_sessions_table(&pool).await?;

    Ok(pool)
}

/// Create the certificates table
///
/// `created_at` is Unix epoch milliseconds, assigned on insert.
pub async fn create_certificates_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS certificates (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            title TEXT NOT NULL DEFAULT '',
            company TEXT NOT NULL DEFAULT '',
            skills TEXT NOT NULL DEFAULT '',
            file_url TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_certificates_owner_created ON certificates (owner_id, created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the sessions table
///
/// Only the SHA-256 digest of each bearer token is stored.
pub async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token_hash TEXT PRIMARY KEY,
            principal_id TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            expires_at INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
