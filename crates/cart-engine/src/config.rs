//! # Engine Configuration
//!
//! ## Configuration Sources (Priority Order)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Configuration Loading                               │
//! │                                                                         │
//! │  1. Built-in defaults                          (lowest priority)       │
//! │       ↓                                                                 │
//! │  2. Config file: <config dir>/cart.toml                                │
//! │       ↓                                                                 │
//! │  3. Environment variables: CART_*                                      │
//! │       ↓                                                                 │
//! │  4. validate()                                 (rejects bad values)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example File
//! ```toml
//! [storage]
//! database_path = "/var/lib/shop/cart.db"
//! snapshot_key = "session-42"
//!
//! [events]
//! channel_capacity = 64
//!
//! [pricing]
//! vat_bps = 2100
//! standard_shipping_cents = 499
//! free_shipping_threshold_cents = 5000
//! ```
//!
//! ## Environment Overrides
//! | Variable              | Field                      |
//! |-----------------------|----------------------------|
//! | `CART_DB_PATH`        | `storage.database_path`    |
//! | `CART_SNAPSHOT_KEY`   | `storage.snapshot_key`     |
//! | `CART_EVENT_CAPACITY` | `events.channel_capacity`  |
//! | `CART_VAT_BPS`        | `pricing.vat_bps`          |

use std::path::PathBuf;

use cart_core::{Money, PricingPolicy, TaxRate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};

/// Upper bound for the event channel; larger values only hide slow receivers.
const MAX_EVENT_CAPACITY: usize = 65_536;

// =============================================================================
// Storage Settings
// =============================================================================

/// Where snapshots live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// SQLite file. `:memory:` keeps snapshots for the process lifetime only.
    pub database_path: PathBuf,

    /// Row the cart is saved under (user or session identifier).
    pub snapshot_key: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            database_path: default_database_path(),
            snapshot_key: "cart".to_string(),
        }
    }
}

/// Platform data dir, or the working directory when there is no home.
///
/// - **macOS**: `~/Library/Application Support/com.cart.engine/cart.db`
/// - **Linux**: `~/.local/share/engine/cart.db`
fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "cart", "engine")
        .map(|dirs| dirs.data_dir().join("cart.db"))
        .unwrap_or_else(|| PathBuf::from("cart.db"))
}

// =============================================================================
// Event Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    /// Broadcast buffer. Receivers further behind than this skip events.
    pub channel_capacity: usize,
}

impl Default for EventSettings {
    fn default() -> Self {
        EventSettings {
            channel_capacity: 64,
        }
    }
}

// =============================================================================
// Pricing Settings
// =============================================================================

/// Checkout pricing in integer units, as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    /// VAT in basis points (2100 = 21%).
    pub vat_bps: u32,
    pub standard_shipping_cents: i64,
    /// Shipping is free strictly above this subtotal.
    pub free_shipping_threshold_cents: i64,
}

impl Default for PricingSettings {
    fn default() -> Self {
        let policy = PricingPolicy::default();
        PricingSettings {
            vat_bps: policy.vat_rate.bps(),
            standard_shipping_cents: policy.standard_shipping.cents(),
            free_shipping_threshold_cents: policy.free_shipping_threshold.cents(),
        }
    }
}

impl PricingSettings {
    /// Converts to the domain policy.
    pub fn policy(&self) -> PricingPolicy {
        PricingPolicy {
            vat_rate: TaxRate::from_bps(self.vat_bps),
            standard_shipping: Money::from_cents(self.standard_shipping_cents),
            free_shipping_threshold: Money::from_cents(self.free_shipping_threshold_cents),
        }
    }
}

// =============================================================================
// Engine Configuration
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub events: EventSettings,

    #[serde(default)]
    pub pricing: PricingSettings,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration backed by an in-memory database (tests, ephemeral carts).
    pub fn in_memory() -> Self {
        let mut config = Self::default();
        config.storage.database_path = PathBuf::from(":memory:");
        config
    }

    /// Sets the snapshot key.
    pub fn with_snapshot_key(mut self, key: impl Into<String>) -> Self {
        self.storage.snapshot_key = key.into();
        self
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> EngineResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> EngineResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| EngineError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| EngineError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| EngineError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Cart config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> EngineResult<()> {
        if self.storage.database_path.as_os_str().is_empty() {
            return Err(EngineError::InvalidConfig(
                "database_path must not be empty".into(),
            ));
        }

        if self.storage.snapshot_key.trim().is_empty() {
            return Err(EngineError::InvalidConfig(
                "snapshot_key must not be empty".into(),
            ));
        }

        if self.events.channel_capacity == 0 || self.events.channel_capacity > MAX_EVENT_CAPACITY {
            return Err(EngineError::InvalidConfig(format!(
                "channel_capacity must be between 1 and {}, got {}",
                MAX_EVENT_CAPACITY, self.events.channel_capacity
            )));
        }

        if self.pricing.vat_bps > 10_000 {
            return Err(EngineError::InvalidConfig(format!(
                "vat_bps must be at most 10000, got {}",
                self.pricing.vat_bps
            )));
        }

        if self.pricing.standard_shipping_cents < 0 || self.pricing.free_shipping_threshold_cents < 0 {
            return Err(EngineError::InvalidConfig(
                "shipping amounts must not be negative".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("CART_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = PathBuf::from(path);
        }

        if let Ok(key) = std::env::var("CART_SNAPSHOT_KEY") {
            debug!(key = %key, "Overriding snapshot key from environment");
            self.storage.snapshot_key = key;
        }

        if let Ok(capacity) = std::env::var("CART_EVENT_CAPACITY") {
            match capacity.parse::<usize>() {
                Ok(c) => self.events.channel_capacity = c,
                Err(_) => warn!(value = %capacity, "Ignoring non-numeric CART_EVENT_CAPACITY"),
            }
        }

        if let Ok(vat) = std::env::var("CART_VAT_BPS") {
            match vat.parse::<u32>() {
                Ok(bps) => self.pricing.vat_bps = bps,
                Err(_) => warn!(value = %vat, "Ignoring non-numeric CART_VAT_BPS"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "cart", "engine")
            .map(|dirs| dirs.config_dir().join("cart.toml"))
    }

    /// Whether snapshots are kept in memory only.
    pub fn is_in_memory(&self) -> bool {
        self.storage.database_path == std::path::Path::new(":memory:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("cart-engine-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();

        assert_eq!(config.storage.snapshot_key, "cart");
        assert_eq!(config.events.channel_capacity, 64);
        assert_eq!(config.pricing.policy(), PricingPolicy::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::in_memory();
        assert!(config.validate().is_ok());

        config.storage.snapshot_key = "  ".to_string();
        assert!(config.validate().is_err());

        config.storage.snapshot_key = "guest".to_string();
        config.events.channel_capacity = 0;
        assert!(config.validate().is_err());

        config.events.channel_capacity = 16;
        config.pricing.vat_bps = 10_001;
        assert!(config.validate().is_err());

        config.pricing.vat_bps = 0;
        config.pricing.standard_shipping_cents = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [storage]
            snapshot_key = "session-42"

            [pricing]
            vat_bps = 1000
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.snapshot_key, "session-42");
        assert_eq!(config.storage.database_path, default_database_path());
        assert_eq!(config.events.channel_capacity, 64);
        assert_eq!(config.pricing.vat_bps, 1000);
        assert_eq!(config.pricing.standard_shipping_cents, 499);
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("roundtrip.toml");
        let config = EngineConfig::in_memory().with_snapshot_key("roundtrip");

        config.save(Some(path.clone())).unwrap();
        let loaded = EngineConfig::load(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.storage.snapshot_key, "roundtrip");
        assert!(loaded.is_in_memory());
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let path = temp_path("broken.toml");
        std::fs::write(&path, "[events]\nchannel_capacity = \"lots\"\n").unwrap();

        assert!(matches!(
            EngineConfig::load(Some(path.clone())),
            Err(EngineError::ConfigLoadFailed(_))
        ));
        assert_eq!(
            EngineConfig::load_or_default(Some(path.clone())).events.channel_capacity,
            64
        );
        std::fs::remove_file(&path).ok();
    }
}
