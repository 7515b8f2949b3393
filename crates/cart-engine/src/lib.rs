//! # cart-engine: Cart Store Runtime
//!
//! Wraps the pure cart transition in the effects a running shop needs:
//! persistence across sessions, a read model, and notifications.
//!
//! ## Module Organization
//! ```text
//! cart_engine
//! ├── store        CartStore: the single serialization point for operations
//! ├── persistence  Load at startup, background writer with last-write-wins
//! ├── events       CartEvent + human-readable messages
//! ├── config       EngineConfig (defaults → cart.toml → CART_* env)
//! └── error        EngineError, EngineResult
//! ```
//!
//! ## Startup
//! ```rust,ignore
//! cart_engine::init_tracing();
//!
//! let config = EngineConfig::load_or_default(None);
//! let store = CartStore::open(config).await?;
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod persistence;
pub mod store;

pub use config::{EngineConfig, EventSettings, PricingSettings, StorageSettings};
pub use error::{EngineError, EngineResult};
pub use events::{CartEvent, CartEventKind};
pub use persistence::{PersistenceAdapter, PersistenceHandle};
pub use store::CartStore;

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=cart=trace` - Show trace for cart crates only
/// - Default: `info,cart=debug,sqlx=warn`
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cart=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_init_tracing_is_idempotent() {
        super::init_tracing();
        super::init_tracing();
    }
}
