//! # Storage Errors
//!
//! ```text
//! sqlx::Error / MigrateError
//!        │
//!        ▼
//!     DbError ──┬── at open:  EngineError::Storage, returned to the host
//!               └── at save:  logged and counted by the persistence writer,
//!                             never seen by the cart operation
//! ```

use thiserror::Error;

/// Snapshot storage failures.
#[derive(Debug, Error)]
pub enum DbError {
    /// The database file could not be opened or created.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Embedded migrations could not be applied.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite rejected a statement (constraint, disk full, locked...).
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// No connection became free within the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Anything sqlx reports that fits none of the above.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => DbError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            sqlx::Error::Io(io) => DbError::ConnectionFailed(io.to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for storage operations.
pub type DbResult<T> = Result<T, DbError>;
