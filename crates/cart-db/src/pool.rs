//! # Connection Pool
//!
//! Opens the SQLite file that holds cart snapshots.
//!
//! ## Access Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CartStore::open ──► Database::new(DbConfig) ──► migrate                │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                  ┌──────────────────────┐                               │
//! │                  │  SqlitePool (≤ 2)    │                               │
//! │                  └──────────┬───────────┘                               │
//! │                 ┌───────────┴────────────┐                              │
//! │                 ▼                        ▼                              │
//! │     startup Load (one read)   persistence writer (one put at a time)    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The file runs in WAL mode: the startup read never waits behind a writer
//! still finishing the previous session's last snapshot.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::snapshot::SnapshotRepository;

const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// How to open the snapshot database.
///
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/shop/cart.db").acquire_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, created on first use. `:memory:` for a private database.
    pub database_path: PathBuf,

    /// Pool size. One connection serves the writer, one the startup read.
    pub max_connections: u32,

    /// How long an operation waits for a free connection.
    pub acquire_timeout: Duration,

    /// Apply embedded migrations when connecting.
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 2,
            acquire_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    /// A private in-memory database. Each call yields a fresh one that lives
    /// as long as its pool.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            // A second connection would open a second, empty database.
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(IN_MEMORY_PATH)
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let url = if self.is_in_memory() {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite://{}?mode=rwc", self.database_path.display())
        };

        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            // A crash may lose the last snapshot, never corrupt the file.
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true);

        Ok(options)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the snapshot database. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connects and, unless disabled, migrates.
    ///
    /// ## Errors
    /// - [`DbError::ConnectionFailed`] when the file can't be opened or created
    /// - [`DbError::MigrationFailed`] when the schema can't be brought up to date
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            max_connections = config.max_connections,
            "Opening cart database"
        );

        let options = config.connect_options()?;

        // Idle connections are never reaped: for `:memory:` that would
        // drop the database with them.
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .idle_timeout(None)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let db = Database { pool };

        if config.run_migrations {
            migrations::run_migrations(&db.pool).await?;
        } else {
            debug!("Skipping migrations");
        }

        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Snapshot rows.
    pub fn snapshots(&self) -> SnapshotRepository {
        SnapshotRepository::new(self.pool.clone())
    }

    /// Whether a trivial query still succeeds.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Closes every connection. Repositories obtained earlier stop working.
    pub async fn close(&self) {
        info!("Closing cart database");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);

        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
        assert!(total >= 1);
    }

    #[tokio::test]
    async fn test_in_memory_databases_are_isolated() {
        let first = Database::new(DbConfig::in_memory()).await.unwrap();
        let second = Database::new(DbConfig::in_memory()).await.unwrap();

        first.snapshots().put("guest", "{}", 1).await.unwrap();

        assert!(second.snapshots().fetch("guest").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_closed_database_is_unhealthy() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        assert!(!db.health_check().await);
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/cart.db")
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(1))
            .run_migrations(false);

        assert_eq!(config.max_connections, 4);
        assert_eq!(config.acquire_timeout, Duration::from_secs(1));
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }
}
