//! # Engine Errors
//!
//! Errors leave the engine only from construction, configuration and
//! explicit flush/shutdown. Cart operations themselves never fail.

use thiserror::Error;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine error type.
#[derive(Debug, Error)]
pub enum EngineError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid engine configuration.
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Persistence Errors
    // =========================================================================
    /// Storage backend error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Snapshot could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Stored snapshot was written by an incompatible build.
    #[error("Snapshot schema version {found} is not supported (expected {expected})")]
    SchemaMismatch { found: i64, expected: i64 },

    /// The persistence writer is no longer running.
    #[error("Channel closed: {0}")]
    ChannelClosed(String),
}

impl From<cart_db::DbError> for EngineError {
    fn from(err: cart_db::DbError) -> Self {
        EngineError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::SerializationFailed(err.to_string())
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for EngineError {
    fn from(err: toml::ser::Error) -> Self {
        EngineError::ConfigSaveFailed(err.to_string())
    }
}
