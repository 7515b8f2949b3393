//! # cart-db: Snapshot Storage for the Cart Engine
//!
//! Durable storage of cart snapshots. Payloads are opaque JSON strings here;
//! parsing and validation belong to the engine's persistence adapter.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Engine Data Flow                            │
//! │                                                                         │
//! │  Persistence writer (cart-engine)                                      │
//! │       │  put(key, payload)                                              │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     cart-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐  │   │
//! │  │   │   Database    │    │ SnapshotRepository │  │ Migrations │  │   │
//! │  │   │   (pool.rs)   │◄───│ (SnapshotStore)    │  │ (embedded) │  │   │
//! │  │   └───────────────┘    └────────────────────┘  └────────────┘  │   │
//! │  │                        ┌────────────────────┐                   │   │
//! │  │                        │ MemorySnapshotStore│  (tests, ephemeral│   │
//! │  │                        │ (SnapshotStore)    │   sessions)       │   │
//! │  │                        └────────────────────┘                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite: cart_snapshots (snapshot_key PK, payload, schema_version)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cart_db::{Database, DbConfig, SnapshotStore};
//!
//! let db = Database::new(DbConfig::new("cart.db")).await?;
//! let repo = db.snapshots();
//! repo.put("guest", r#"{"lines":[],"total":0,"itemCount":0}"#, 1).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::snapshot::{SnapshotRecord, SnapshotRepository, SNAPSHOT_SCHEMA_VERSION};
pub use store::{MemorySnapshotStore, SnapshotStore};
