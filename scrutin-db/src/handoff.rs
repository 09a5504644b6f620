//! Key-value hand-off between workflow steps
//!
//! Each step writes its output under a fixed key and the next step reads it
//! back. Values are JSON; writes replace the previous value for the key.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::Result;

/// The fixed set of hand-off keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandoffKey {
    JiraTickets,
    GithubPrs,
    ConcatenatedFiles,
    ReferenceContents,
    ReviewResult,
}

impl HandoffKey {
    pub const ALL: [HandoffKey; 5] = [
        HandoffKey::JiraTickets,
        HandoffKey::GithubPrs,
        HandoffKey::ConcatenatedFiles,
        HandoffKey::ReferenceContents,
        HandoffKey::ReviewResult,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HandoffKey::JiraTickets => "jiraTickets",
            HandoffKey::GithubPrs => "githubPRs",
            HandoffKey::ConcatenatedFiles => "concatenatedFiles",
            HandoffKey::ReferenceContents => "referenceContents",
            HandoffKey::ReviewResult => "reviewResult",
        }
    }
}

impl fmt::Display for HandoffKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandoffKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        HandoffKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("Unknown hand-off key: {}", s))
    }
}

/// Summary of one stored value
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct HandoffEntry {
    pub key: String,
    pub bytes: i64,
    pub updated_at: DateTime<Utc>,
}

/// Repository over the `handoff` table
pub struct HandoffStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> HandoffStore<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Store `value` under `key`, replacing any previous value
    pub async fn put<T: Serialize + ?Sized>(&self, key: HandoffKey, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;

        sqlx::query(
            r#"
            INSERT INTO handoff (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key.as_str())
        .bind(&json)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;

        debug!(key = %key, bytes = json.len(), "Stored hand-off value");
        Ok(())
    }

    /// Read the raw JSON stored under `key`
    pub async fn get_raw(&self, key: HandoffKey) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM handoff WHERE key = ?")
            .bind(key.as_str())
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    /// Read and decode the value under `key`
    ///
    /// A missing key and a value that fails to decode both yield `None`;
    /// the latter is logged.
    pub async fn get<T: DeserializeOwned>(&self, key: HandoffKey) -> Result<Option<T>> {
        let Some(raw) = self.get_raw(key).await? else {
            debug!(key = %key, "No hand-off value stored");
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key = %key, error = %e, "Ignoring malformed hand-off value");
                Ok(None)
            }
        }
    }

    /// Remove the value under `key`
    pub async fn remove(&self, key: HandoffKey) -> Result<()> {
        sqlx::query("DELETE FROM handoff WHERE key = ?")
            .bind(key.as_str())
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Remove every stored value
    pub async fn clear(&self) -> Result<()> {
        let result = sqlx::query("DELETE FROM handoff").execute(self.pool).await?;
        debug!(removed = result.rows_affected(), "Cleared hand-off store");
        Ok(())
    }

    /// What is currently stored, ordered by key
    pub async fn entries(&self) -> Result<Vec<HandoffEntry>> {
        Ok(sqlx::query_as::<_, HandoffEntry>(
            "SELECT key, LENGTH(CAST(value AS BLOB)) AS bytes, updated_at FROM handoff ORDER BY key",
        )
        .fetch_all(self.pool)
        .await?)
    }
}
