//! # Snapshot Store Seam
//!
//! The persistence adapter talks to storage only through [`SnapshotStore`],
//! so the engine can run against SQLite or against memory.
//!
//! ```text
//! ┌────────────────────┐        ┌──────────────────────────────────┐
//! │ PersistenceAdapter │──dyn──►│ SnapshotStore                    │
//! └────────────────────┘        │  ├── SnapshotRepository (SQLite) │
//!                               │  └── MemorySnapshotStore         │
//!                               └──────────────────────────────────┘
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::DbResult;
use crate::repository::snapshot::{SnapshotRecord, SnapshotRepository};

/// Key-addressed storage of opaque snapshot payloads.
#[async_trait]
pub trait SnapshotStore: Send + Sync + 'static {
    /// Reads the snapshot under `key`. `Ok(None)` when nothing was saved.
    async fn fetch(&self, key: &str) -> DbResult<Option<SnapshotRecord>>;

    /// Writes the snapshot under `key`, replacing any previous one.
    async fn put(&self, key: &str, payload: &str, schema_version: i64) -> DbResult<()>;

    /// Deletes the snapshot under `key`. Returns whether one existed.
    async fn remove(&self, key: &str) -> DbResult<bool>;
}

#[async_trait]
impl SnapshotStore for SnapshotRepository {
    async fn fetch(&self, key: &str) -> DbResult<Option<SnapshotRecord>> {
        SnapshotRepository::fetch(self, key).await
    }

    async fn put(&self, key: &str, payload: &str, schema_version: i64) -> DbResult<()> {
        SnapshotRepository::put(self, key, payload, schema_version).await
    }

    async fn remove(&self, key: &str) -> DbResult<bool> {
        SnapshotRepository::remove(self, key).await
    }
}

// =============================================================================
// Memory Store
// =============================================================================

/// Non-durable store. Snapshots live as long as the value does.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    rows: RwLock<HashMap<String, SnapshotRecord>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn fetch(&self, key: &str) -> DbResult<Option<SnapshotRecord>> {
        Ok(self.rows.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, payload: &str, schema_version: i64) -> DbResult<()> {
        let record = SnapshotRecord {
            snapshot_key: key.to_string(),
            payload: payload.to_string(),
            schema_version,
            saved_at: Utc::now(),
        };
        self.rows.write().await.insert(key.to_string(), record);
        Ok(())
    }

    async fn remove(&self, key: &str) -> DbResult<bool> {
        Ok(self.rows.write().await.remove(key).is_some())
    }
}
