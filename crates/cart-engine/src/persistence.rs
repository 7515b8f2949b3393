//! # Persistence Adapter
//!
//! Loads the saved cart at startup and writes snapshots back in the
//! background.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CartStore (under its mutex)                                            │
//! │       │  handle.save(snapshot)      never awaits, never fails           │
//! │       ▼                                                                 │
//! │  ┌───────────────────────────────┐                                      │
//! │  │ unbounded mpsc (FIFO)         │  Save(s1) Save(s2) Flush Save(s3)    │
//! │  └───────────────┬───────────────┘                                      │
//! │                  ▼                                                      │
//! │  SnapshotWriter task                                                    │
//! │   ├── Save: drain queued Saves, keep only the newest, write it          │
//! │   ├── Flush: reply once everything queued before it is written          │
//! │   └── Shutdown: close the queue, count late saves, reply, exit          │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │  SnapshotStore::put(key, json, SNAPSHOT_SCHEMA_VERSION)                 │
//! │       └── Err → error! + failed_writes += 1  (state untouched)          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Snapshots enter the queue in transition order and a single task writes
//! them, so the durable row can never move backwards. Dropping intermediate
//! snapshots is safe because each one is a full replacement.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cart_core::CartState;
use cart_db::{SnapshotRecord, SnapshotStore, SNAPSHOT_SCHEMA_VERSION};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::error::{EngineError, EngineResult};

// =============================================================================
// Encoding
// =============================================================================

/// Serializes a cart into the stored payload.
pub fn encode(state: &CartState) -> EngineResult<String> {
    Ok(serde_json::to_string(state)?)
}

/// Parses and validates a stored row.
pub fn decode(record: &SnapshotRecord) -> EngineResult<CartState> {
    if record.schema_version != SNAPSHOT_SCHEMA_VERSION {
        return Err(EngineError::SchemaMismatch {
            found: record.schema_version,
            expected: SNAPSHOT_SCHEMA_VERSION,
        });
    }

    Ok(serde_json::from_str(&record.payload)?)
}

// =============================================================================
// Adapter
// =============================================================================

/// Reads and writes one cart's snapshot.
#[derive(Clone)]
pub struct PersistenceAdapter {
    store: Arc<dyn SnapshotStore>,
    key: String,
}

impl PersistenceAdapter {
    pub fn new(store: Arc<dyn SnapshotStore>, key: impl Into<String>) -> Self {
        PersistenceAdapter {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the saved cart, or an empty cart when there is none or it
    /// cannot be used. Never fails.
    pub async fn load(&self) -> CartState {
        match self.store.fetch(&self.key).await {
            Ok(None) => {
                debug!(key = %self.key, "No saved cart, starting empty");
                CartState::empty()
            }
            Ok(Some(record)) => match decode(&record) {
                Ok(state) => {
                    info!(
                        key = %self.key,
                        lines = state.line_count(),
                        item_count = state.item_count(),
                        saved_at = %record.saved_at,
                        "Restored saved cart"
                    );
                    state
                }
                Err(e) => {
                    warn!(key = %self.key, error = %e, "Discarding unusable cart snapshot");
                    CartState::empty()
                }
            },
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read cart snapshot, starting empty");
                CartState::empty()
            }
        }
    }

    /// Spawns the background writer. Must be called inside a tokio runtime.
    pub fn start_writer(&self) -> PersistenceHandle {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let failed = Arc::new(AtomicU64::new(0));
        let written = Arc::new(AtomicU64::new(0));

        let writer = SnapshotWriter {
            store: Arc::clone(&self.store),
            key: self.key.clone(),
            failed: Arc::clone(&failed),
            written: Arc::clone(&written),
        };

        tokio::spawn(async move {
            writer.run(cmd_rx).await;
        });

        PersistenceHandle {
            cmd_tx,
            failed,
            written,
        }
    }
}

impl std::fmt::Debug for PersistenceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceAdapter")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Writer Handle
// =============================================================================

/// Commands for the writer task.
#[derive(Debug)]
enum WriterCommand {
    Save(Arc<CartState>),
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// Handle for feeding the writer task.
#[derive(Debug, Clone)]
pub struct PersistenceHandle {
    cmd_tx: mpsc::UnboundedSender<WriterCommand>,
    failed: Arc<AtomicU64>,
    written: Arc<AtomicU64>,
}

impl PersistenceHandle {
    /// Queues a snapshot for writing. Fire-and-forget.
    ///
    /// After shutdown the snapshot is dropped and counted as a failed write.
    pub fn save(&self, state: Arc<CartState>) {
        if self.cmd_tx.send(WriterCommand::Save(state)).is_err() {
            self.failed.fetch_add(1, Ordering::Relaxed);
            warn!("Persistence writer stopped, snapshot not saved");
        }
    }

    /// Waits until every snapshot queued so far has been written (or failed).
    pub async fn flush(&self) -> EngineResult<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.cmd_tx
            .send(WriterCommand::Flush(done_tx))
            .map_err(|_| EngineError::ChannelClosed("Persistence writer stopped".into()))?;
        done_rx
            .await
            .map_err(|_| EngineError::ChannelClosed("Persistence writer stopped".into()))
    }

    /// Writes what is queued, then stops the writer.
    pub async fn shutdown(&self) -> EngineResult<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.cmd_tx
            .send(WriterCommand::Shutdown(done_tx))
            .map_err(|_| EngineError::ChannelClosed("Persistence writer already stopped".into()))?;
        done_rx
            .await
            .map_err(|_| EngineError::ChannelClosed("Persistence writer stopped".into()))
    }

    /// Number of snapshots that could not be written.
    pub fn failed_writes(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Number of snapshots written successfully.
    pub fn completed_writes(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }
}

// =============================================================================
// Writer Task
// =============================================================================

struct SnapshotWriter {
    store: Arc<dyn SnapshotStore>,
    key: String,
    failed: Arc<AtomicU64>,
    written: Arc<AtomicU64>,
}

impl SnapshotWriter {
    async fn run(self, mut cmd_rx: mpsc::UnboundedReceiver<WriterCommand>) {
        debug!(key = %self.key, "Persistence writer started");

        // A control command found while coalescing saves runs next.
        let mut deferred: Option<WriterCommand> = None;

        loop {
            let cmd = match deferred.take() {
                Some(cmd) => cmd,
                None => match cmd_rx.recv().await {
                    Some(cmd) => cmd,
                    None => break,
                },
            };

            match cmd {
                WriterCommand::Save(mut latest) => {
                    let mut skipped = 0u32;
                    while let Ok(next) = cmd_rx.try_recv() {
                        match next {
                            WriterCommand::Save(newer) => {
                                latest = newer;
                                skipped += 1;
                            }
                            other => {
                                deferred = Some(other);
                                break;
                            }
                        }
                    }
                    if skipped > 0 {
                        debug!(skipped, "Coalesced queued cart snapshots");
                    }
                    self.write(&latest).await;
                }
                WriterCommand::Flush(done) => {
                    let _ = done.send(());
                }
                WriterCommand::Shutdown(done) => {
                    info!(key = %self.key, "Persistence writer shutting down");
                    // Refuse new commands before acknowledging, then account
                    // for saves that slipped in behind the shutdown.
                    cmd_rx.close();
                    let mut dropped = 0u64;
                    while let Ok(late) = cmd_rx.try_recv() {
                        if matches!(late, WriterCommand::Save(_)) {
                            dropped += 1;
                        }
                    }
                    if dropped > 0 {
                        self.failed.fetch_add(dropped, Ordering::Relaxed);
                        warn!(key = %self.key, dropped, "Snapshots queued after shutdown not saved");
                    }
                    let _ = done.send(());
                    break;
                }
            }
        }

        debug!(key = %self.key, "Persistence writer stopped");
    }

    async fn write(&self, state: &CartState) {
        let payload = match encode(state) {
            Ok(payload) => payload,
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                error!(key = %self.key, error = %e, "Failed to encode cart snapshot");
                return;
            }
        };

        match self.store.put(&self.key, &payload, SNAPSHOT_SCHEMA_VERSION).await {
            Ok(()) => {
                self.written.fetch_add(1, Ordering::Relaxed);
                debug!(
                    key = %self.key,
                    item_count = state.item_count(),
                    "Cart snapshot saved"
                );
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                error!(key = %self.key, error = %e, "Failed to save cart snapshot");
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cart_core::{transition, CartOp, Money, Product, VariantSelection};
    use cart_db::MemorySnapshotStore;

    fn adapter() -> (Arc<MemorySnapshotStore>, PersistenceAdapter) {
        let store = Arc::new(MemorySnapshotStore::new());
        let adapter = PersistenceAdapter::new(store.clone(), "guest");
        (store, adapter)
    }

    fn cart_with(quantity: i64) -> CartState {
        let polo = Product::new("2", "Polo Ralph Lauren", Money::from_cents(8_900), 10)
            .with_sizes(["M"]);
        transition(
            &CartState::empty(),
            &CartOp::add(polo, quantity, VariantSelection::none().size("M")),
        )
    }

    #[tokio::test]
    async fn test_load_without_snapshot_is_empty() {
        let (_, adapter) = adapter();

        assert_eq!(adapter.load().await, CartState::empty());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let (_, adapter) = adapter();
        let writer = adapter.start_writer();
        let cart = cart_with(3);

        writer.save(Arc::new(cart.clone()));
        writer.flush().await.unwrap();

        assert_eq!(adapter.load().await, cart);
        assert_eq!(writer.completed_writes(), 1);
        assert_eq!(writer.failed_writes(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_payload_loads_empty() {
        let (store, adapter) = adapter();
        store.put("guest", "{not json", SNAPSHOT_SCHEMA_VERSION).await.unwrap();

        assert_eq!(adapter.load().await, CartState::empty());
    }

    #[tokio::test]
    async fn test_inconsistent_totals_load_empty() {
        let (store, adapter) = adapter();
        let mut json: serde_json::Value = serde_json::to_value(cart_with(2)).unwrap();
        json["total"] = serde_json::json!(1);
        store
            .put("guest", &json.to_string(), SNAPSHOT_SCHEMA_VERSION)
            .await
            .unwrap();

        assert_eq!(adapter.load().await, CartState::empty());
    }

    #[tokio::test]
    async fn test_other_schema_version_loads_empty() {
        let (store, adapter) = adapter();
        let payload = encode(&cart_with(1)).unwrap();
        store.put("guest", &payload, SNAPSHOT_SCHEMA_VERSION + 1).await.unwrap();

        assert_eq!(adapter.load().await, CartState::empty());
    }

    #[tokio::test]
    async fn test_last_queued_snapshot_wins() {
        let (_, adapter) = adapter();
        let writer = adapter.start_writer();

        for quantity in 1..=5 {
            writer.save(Arc::new(cart_with(quantity)));
        }
        writer.flush().await.unwrap();

        assert_eq!(adapter.load().await.item_count(), 5);
        assert!(writer.completed_writes() >= 1);
    }

    #[tokio::test]
    async fn test_save_after_shutdown_is_counted() {
        let (_, adapter) = adapter();
        let writer = adapter.start_writer();

        writer.shutdown().await.unwrap();
        writer.save(Arc::new(cart_with(1)));

        assert_eq!(writer.failed_writes(), 1);
        assert!(writer.flush().await.is_err());
    }

    #[tokio::test]
    async fn test_save_racing_shutdown_is_counted() {
        let (store, adapter) = adapter();
        let writer = adapter.start_writer();

        // The save lands in the queue behind the shutdown request.
        let (stopped, ()) = tokio::join!(writer.shutdown(), async {
            writer.save(Arc::new(cart_with(1)));
        });
        stopped.unwrap();

        assert_eq!(writer.failed_writes(), 1);
        assert_eq!(writer.completed_writes(), 0);
        assert!(store.fetch("guest").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overflowing_prices_load_empty() {
        let (store, adapter) = adapter();
        let payload = serde_json::json!({
            "lines": [{
                "product": { "id": "1", "name": "A", "price": i64::MAX, "stock": 5 },
                "quantity": 2
            }],
            "total": 0,
            "itemCount": 2
        });
        store
            .put("guest", &payload.to_string(), SNAPSHOT_SCHEMA_VERSION)
            .await
            .unwrap();

        assert_eq!(adapter.load().await, CartState::empty());
    }

    #[tokio::test]
    async fn test_overflowing_total_loads_empty() {
        let (store, adapter) = adapter();
        let line = |id: &str| {
            serde_json::json!({
                "product": { "id": id, "name": "A", "price": i64::MAX / 2 + 1, "stock": 5 },
                "quantity": 1
            })
        };
        let payload = serde_json::json!({
            "lines": [line("1"), line("2")],
            "total": 0,
            "itemCount": 2
        });
        store
            .put("guest", &payload.to_string(), SNAPSHOT_SCHEMA_VERSION)
            .await
            .unwrap();

        assert_eq!(adapter.load().await, CartState::empty());
    }
}
