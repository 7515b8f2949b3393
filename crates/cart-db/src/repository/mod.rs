//! # Repository Module
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Persistence writer                                                    │
//! │       │                                                                 │
//! │       │  db.snapshots().put("guest", payload, 1)                       │
//! │       ▼                                                                 │
//! │  SnapshotRepository                                                    │
//! │  ├── fetch(&self, key)                                                 │
//! │  ├── put(&self, key, payload, schema_version)   ← upsert               │
//! │  ├── remove(&self, key)                                                │
//! │  └── count(&self)                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SnapshotRepository`](snapshot::SnapshotRepository) - Cart snapshot rows

pub mod snapshot;
