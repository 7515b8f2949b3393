//! Cart persistence across process sessions, against a real SQLite file.

use std::path::PathBuf;

use cart_core::{Money, Product, VariantSelection};
use cart_db::{Database, DbConfig, SNAPSHOT_SCHEMA_VERSION};
use cart_engine::{CartStore, EngineConfig};

fn scratch_db(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cart-engine-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{name}.db"));
    for suffix in ["", "-wal", "-shm"] {
        std::fs::remove_file(format!("{}{}", path.display(), suffix)).ok();
    }
    path
}

fn config_for(path: &PathBuf) -> EngineConfig {
    let mut config = EngineConfig::default().with_snapshot_key("session-1");
    config.storage.database_path = path.clone();
    config
}

fn sneakers() -> Product {
    Product::new("4", "Zapatillas Air Jordan 1", Money::from_cents(16_900), 8)
        .with_sizes(["42", "43"])
        .with_category("Calzado")
}

#[tokio::test]
async fn cart_is_restored_in_the_next_session() {
    let path = scratch_db("restore");

    let first = CartStore::open(config_for(&path)).await.unwrap();
    first.add_item(sneakers(), 2, VariantSelection::none().size("42"));
    first.add_item(sneakers(), 1, VariantSelection::none().size("43"));
    first.update_quantity("4", 3);
    let expected = first.snapshot();
    first.shutdown().await.unwrap();
    assert_eq!(first.failed_writes(), 0);

    let second = CartStore::open(config_for(&path)).await.unwrap();
    let restored = second.snapshot();
    second.shutdown().await.unwrap();

    assert_eq!(restored, expected);
    assert_eq!(restored.line_count(), 2);
    assert_eq!(restored.item_count(), 6);
    assert_eq!(restored.total(), Money::from_cents(6 * 16_900));
}

#[tokio::test]
async fn corrupt_snapshot_starts_an_empty_cart() {
    let path = scratch_db("corrupt");

    let db = Database::new(DbConfig::new(&path)).await.unwrap();
    db.snapshots()
        .put("session-1", "{\"lines\": [", SNAPSHOT_SCHEMA_VERSION)
        .await
        .unwrap();
    db.close().await;

    let store = CartStore::open(config_for(&path)).await.unwrap();
    assert!(store.snapshot().is_empty());

    // The next save replaces the unreadable row.
    store.add_item(sneakers(), 1, VariantSelection::none().size("43"));
    store.shutdown().await.unwrap();

    let reopened = CartStore::open(config_for(&path)).await.unwrap();
    assert_eq!(reopened.snapshot().item_count(), 1);
    reopened.shutdown().await.unwrap();
}

#[tokio::test]
async fn carts_are_kept_per_snapshot_key() {
    let path = scratch_db("keys");

    let alice = CartStore::open(config_for(&path).with_snapshot_key("alice"))
        .await
        .unwrap();
    alice.add_item(sneakers(), 1, VariantSelection::none());
    alice.shutdown().await.unwrap();

    let bob = CartStore::open(config_for(&path).with_snapshot_key("bob"))
        .await
        .unwrap();
    assert!(bob.snapshot().is_empty());
    bob.shutdown().await.unwrap();
}
