//! # Snapshot Repository
//!
//! One row per cart owner. Every save overwrites the row (upsert), so the
//! table always holds the latest snapshot and nothing else.
//!
//! ## Row Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   (no row) ──put──► {payload v1, saved_at t1}                          │
//! │                          │                                              │
//! │                          └──put──► {payload v2, saved_at t2}           │
//! │                                         │                               │
//! │                                         └──remove──► (no row)          │
//! │                                                                         │
//! │   fetch on a missing row → Ok(None), the engine starts with an        │
//! │   empty cart                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Version of the payload shape written by this build.
///
/// Rows carrying any other version are ignored on load.
pub const SNAPSHOT_SCHEMA_VERSION: i64 = 1;

/// A stored snapshot row.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SnapshotRecord {
    pub snapshot_key: String,
    /// JSON as written by the engine. Not validated here.
    pub payload: String,
    pub schema_version: i64,
    pub saved_at: DateTime<Utc>,
}

/// Repository for cart snapshot rows.
#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    pool: SqlitePool,
}

impl SnapshotRepository {
    /// Creates a new SnapshotRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SnapshotRepository { pool }
    }

    /// Gets the snapshot stored under `key`, if any.
    pub async fn fetch(&self, key: &str) -> DbResult<Option<SnapshotRecord>> {
        let record = sqlx::query_as::<_, SnapshotRecord>(
            r#"
            SELECT snapshot_key, payload, schema_version, saved_at
            FROM cart_snapshots
            WHERE snapshot_key = ?1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Inserts or overwrites the snapshot stored under `key`.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let payload = serde_json::to_string(&state)?;
    /// repo.put("guest", &payload, SNAPSHOT_SCHEMA_VERSION).await?;
    /// ```
    pub async fn put(&self, key: &str, payload: &str, schema_version: i64) -> DbResult<()> {
        let now = Utc::now();

        debug!(key = %key, bytes = payload.len(), "Writing cart snapshot");

        sqlx::query(
            r#"
            INSERT INTO cart_snapshots (snapshot_key, payload, schema_version, saved_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(snapshot_key) DO UPDATE SET
                payload = excluded.payload,
                schema_version = excluded.schema_version,
                saved_at = excluded.saved_at
            "#,
        )
        .bind(key)
        .bind(payload)
        .bind(schema_version)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes the snapshot stored under `key`.
    ///
    /// ## Returns
    /// `true` if a row was removed.
    pub async fn remove(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM cart_snapshots WHERE snapshot_key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts stored snapshots.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart_snapshots")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn repo() -> SnapshotRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().snapshots()
    }

    #[tokio::test]
    async fn test_fetch_missing_is_none() {
        let repo = repo().await;

        assert_eq!(repo.fetch("guest").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_then_fetch() {
        let repo = repo().await;

        repo.put("guest", r#"{"lines":[],"total":0,"itemCount":0}"#, SNAPSHOT_SCHEMA_VERSION)
            .await
            .unwrap();

        let record = repo.fetch("guest").await.unwrap().unwrap();
        assert_eq!(record.snapshot_key, "guest");
        assert_eq!(record.payload, r#"{"lines":[],"total":0,"itemCount":0}"#);
        assert_eq!(record.schema_version, SNAPSHOT_SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let repo = repo().await;

        repo.put("guest", "first", 1).await.unwrap();
        repo.put("guest", "second", 2).await.unwrap();

        let record = repo.fetch("guest").await.unwrap().unwrap();
        assert_eq!(record.payload, "second");
        assert_eq!(record.schema_version, 2);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let repo = repo().await;

        repo.put("alice", "a", 1).await.unwrap();
        repo.put("bob", "b", 1).await.unwrap();

        assert!(repo.remove("alice").await.unwrap());
        assert!(!repo.remove("alice").await.unwrap());
        assert_eq!(repo.fetch("bob").await.unwrap().unwrap().payload, "b");
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
