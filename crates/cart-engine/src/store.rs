//! # Cart Store
//!
//! Owns the canonical cart and runs every operation through one pipeline.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         CartStore::apply(op)                            │
//! │                                                                         │
//! │   lock ───────────────────────────────────────────────────────┐        │
//! │   │ previous = current                                         │        │
//! │   │ next     = transition(previous, op)       (pure, no I/O)   │        │
//! │   │ current  = next                                            │        │
//! │   │ persistence.save(next)                    (enqueue only)   │        │
//! │   │ watch.send_replace(next)                  (read model)     │        │
//! │   │ events.send(CartEvent)                    (advisory)       │        │
//! │   unlock ─────────────────────────────────────────────────────┘        │
//! │                                                                         │
//! │   Everything inside the lock is synchronous, so concurrent callers     │
//! │   see a total order and saves are queued in that same order.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let store = CartStore::open(EngineConfig::load_or_default(None)).await?;
//!
//! let mut toasts = store.events();
//! store.add_item(product, 1, VariantSelection::none().size("M"));
//!
//! let cart = store.snapshot();
//! println!("{} items, {}", cart.item_count(), cart.total());
//!
//! store.shutdown().await?;
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use cart_core::{
    transition, CartOp, CartState, CheckoutSummary, CoreResult, PricingPolicy, Product, PromoCode,
    VariantSelection,
};
use cart_db::{Database, DbConfig, SnapshotStore};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::events::CartEvent;
use crate::persistence::{PersistenceAdapter, PersistenceHandle};

/// Cloneable handle to a cart. All clones share the same state.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<Inner>,
}

struct Inner {
    /// Serialization point for operations.
    current: Mutex<Arc<CartState>>,
    read_model: watch::Sender<Arc<CartState>>,
    events: broadcast::Sender<CartEvent>,
    persistence: PersistenceHandle,
    pricing: PricingPolicy,
    /// Present when the store opened the database itself.
    database: Option<Database>,
}

impl CartStore {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Opens the configured SQLite database and restores the saved cart.
    ///
    /// ## Errors
    /// Invalid configuration, or the database cannot be opened or migrated.
    /// A missing or unreadable snapshot is not an error.
    pub async fn open(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;

        let db_config = if config.is_in_memory() {
            DbConfig::in_memory()
        } else {
            if let Some(parent) = config.storage.database_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| cart_db::DbError::ConnectionFailed(e.to_string()))?;
                }
            }
            DbConfig::new(&config.storage.database_path)
        };

        let database = Database::new(db_config).await?;
        let store: Arc<dyn SnapshotStore> = Arc::new(database.snapshots());

        Self::build(store, config, Some(database)).await
    }

    /// Uses an existing snapshot store instead of opening a database.
    pub async fn with_store(store: Arc<dyn SnapshotStore>, config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Self::build(store, config, None).await
    }

    async fn build(
        store: Arc<dyn SnapshotStore>,
        config: EngineConfig,
        database: Option<Database>,
    ) -> EngineResult<Self> {
        let adapter = PersistenceAdapter::new(store, config.storage.snapshot_key.clone());
        let initial = Arc::new(adapter.load().await);
        let persistence = adapter.start_writer();

        let (read_model, _) = watch::channel(Arc::clone(&initial));
        let (events, _) = broadcast::channel(config.events.channel_capacity);

        info!(
            key = %adapter.key(),
            lines = initial.line_count(),
            item_count = initial.item_count(),
            "Cart store ready"
        );

        Ok(CartStore {
            inner: Arc::new(Inner {
                current: Mutex::new(initial),
                read_model,
                events,
                persistence,
                pricing: config.pricing.policy(),
                database,
            }),
        })
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Applies one operation and returns the resulting cart.
    ///
    /// Never fails: persistence happens in the background and notification
    /// delivery is best-effort.
    pub fn apply(&self, op: CartOp) -> Arc<CartState> {
        let mut current = self
            .inner
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let previous = Arc::clone(&current);
        let next = Arc::new(transition(&previous, &op));
        *current = Arc::clone(&next);

        self.inner.persistence.save(Arc::clone(&next));
        self.inner.read_model.send_replace(Arc::clone(&next));

        if let Some(event) = CartEvent::for_transition(&op, &previous, &next) {
            // Err only means nobody is listening.
            let _ = self.inner.events.send(event);
        }

        debug!(
            op = op.name(),
            lines = next.line_count(),
            item_count = next.item_count(),
            total = %next.total(),
            "Applied cart operation"
        );

        next
    }

    /// Adds `quantity` units of `product` with the chosen variant.
    pub fn add_item(&self, product: Product, quantity: i64, selection: VariantSelection) -> Arc<CartState> {
        self.apply(CartOp::add(product, quantity, selection))
    }

    /// Removes every line of the product, whatever its variant.
    pub fn remove_item(&self, product_id: impl Into<String>) -> Arc<CartState> {
        self.apply(CartOp::remove(product_id))
    }

    /// Sets the quantity of the product's line(s). `quantity <= 0` removes.
    pub fn update_quantity(&self, product_id: impl Into<String>, quantity: i64) -> Arc<CartState> {
        self.apply(CartOp::update_quantity(product_id, quantity))
    }

    /// Empties the cart.
    pub fn clear(&self) -> Arc<CartState> {
        self.apply(CartOp::clear())
    }

    // =========================================================================
    // Reading
    // =========================================================================

    /// Current cart.
    pub fn snapshot(&self) -> Arc<CartState> {
        let current = self
            .inner
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current)
    }

    /// Watches the cart; the receiver always holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<CartState>> {
        self.inner.read_model.subscribe()
    }

    /// Receives notifications for operations applied from now on.
    pub fn events(&self) -> broadcast::Receiver<CartEvent> {
        self.inner.events.subscribe()
    }

    /// Checkout amounts for the current cart.
    pub fn summary(&self, promo: Option<PromoCode>) -> CheckoutSummary {
        CheckoutSummary::compute(&self.snapshot(), &self.inner.pricing, promo)
    }

    /// Checkout amounts with a promo code as typed by the shopper.
    pub fn summary_with_code(&self, code: &str) -> CoreResult<CheckoutSummary> {
        let promo: PromoCode = code.parse()?;
        Ok(self.summary(Some(promo)))
    }

    pub fn pricing(&self) -> &PricingPolicy {
        &self.inner.pricing
    }

    // =========================================================================
    // Persistence Control
    // =========================================================================

    /// Waits until every snapshot saved so far has reached storage (or failed).
    pub async fn flush(&self) -> EngineResult<()> {
        self.inner.persistence.flush().await
    }

    /// Writes pending snapshots, stops the writer and closes the database.
    ///
    /// Operations applied afterwards still update the in-memory cart but
    /// are no longer persisted.
    pub async fn shutdown(&self) -> EngineResult<()> {
        self.inner.persistence.shutdown().await?;
        if let Some(database) = &self.inner.database {
            database.close().await;
        }
        info!("Cart store shut down");
        Ok(())
    }

    /// Number of snapshots that failed to persist.
    pub fn failed_writes(&self) -> u64 {
        self.inner.persistence.failed_writes()
    }

    /// Number of snapshots written successfully.
    pub fn completed_writes(&self) -> u64 {
        self.inner.persistence.completed_writes()
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let current = self.snapshot();
        f.debug_struct("CartStore")
            .field("lines", &current.line_count())
            .field("item_count", &current.item_count())
            .field("failed_writes", &self.failed_writes())
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
