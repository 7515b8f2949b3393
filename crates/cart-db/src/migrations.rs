//! # Schema Migrations
//!
//! SQL files under `migrations/sqlite/` are compiled into the binary and
//! applied in filename order on connect. Applied files are recorded in
//! `_sqlx_migrations`, so reconnecting is a no-op.
//!
//! ```text
//! migrations/sqlite/
//! └── 001_cart_snapshots.sql   one row per cart owner
//! ```
//!
//! Never edit an applied file; add `NNN_next_change.sql` instead. A change
//! to the payload shape also bumps
//! [`SNAPSHOT_SCHEMA_VERSION`](crate::repository::snapshot::SNAPSHOT_SCHEMA_VERSION).

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies pending migrations.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    info!(known = MIGRATOR.migrations.len(), "Cart schema up to date");
    Ok(())
}

/// `(embedded, applied)` migration counts, for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((MIGRATOR.migrations.len(), applied as usize))
}
