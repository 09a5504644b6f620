//! Database layer for Scrutin
//!
//! Persists the hand-off state each workflow step leaves for the next one.

pub mod error;
pub mod handoff;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

pub use error::{Error, Result};
pub use handoff::{HandoffEntry, HandoffKey, HandoffStore};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS handoff (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database at `db_path`
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Io(format!("Failed to create database directory: {}", e)))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| Error::Schema(e.to_string()))?;

        tracing::debug!(path = %db_path.display(), "Opened hand-off database");

        Ok(Self { pool })
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the hand-off store
    pub fn handoff(&self) -> HandoffStore<'_> {
        HandoffStore::new(&self.pool)
    }
}
