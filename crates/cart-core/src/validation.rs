//! # Validation Module
//!
//! Checks for products entering the cart and snapshots coming back from
//! storage.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Where Validation Runs                              │
//! │                                                                         │
//! │  Catalog product ──► validate_product ──► AddItem ignored if invalid    │
//! │                                                                         │
//! │  Stored snapshot ──► validate_snapshot ──► Load falls back to empty     │
//! │                      ├── every product valid                            │
//! │                      ├── 1 <= quantity <= stock                         │
//! │                      ├── identity keys unique                           │
//! │                      └── total / itemCount fit and equal the fold       │
//! │                                                                         │
//! │  A state produced by transitions always passes validate_snapshot, so    │
//! │  Save → Load round-trips.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use crate::cart::{fold_totals, CartSnapshot};
use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{CartLine, Product};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Product Validators
// =============================================================================

/// Validates a product identifier. Any non-empty string is a valid key.
///
/// ```rust
/// use cart_core::validation::validate_product_id;
///
/// assert!(validate_product_id("sku-0001").is_ok());
/// assert!(validate_product_id("").is_err());
/// ```
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    if id.is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    Ok(())
}

/// Validates a unit price. Zero is allowed (free items).
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a discount percentage.
pub fn validate_discount(percent: u8) -> ValidationResult<()> {
    if percent > 100 {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates everything the cart relies on in a product record.
///
/// Names are display text and are taken as given.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_product_id(&product.id)?;
    validate_price(product.price)?;
    if let Some(discount) = product.discount {
        validate_discount(discount)?;
    }
    Ok(())
}

// =============================================================================
// Snapshot Validators
// =============================================================================

/// Validates a single stored line.
pub fn validate_line(line: &CartLine) -> ValidationResult<()> {
    validate_product(&line.product)?;

    if line.quantity == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if line.quantity > line.product.stock {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: i64::from(line.product.stock),
        });
    }

    Ok(())
}

/// Validates a full snapshot before it becomes a `CartState`.
pub fn validate_snapshot(snapshot: &CartSnapshot) -> ValidationResult<()> {
    let mut seen = HashSet::with_capacity(snapshot.lines.len());

    for line in &snapshot.lines {
        validate_line(line)?;
        if !seen.insert(line.key()) {
            return Err(ValidationError::DuplicateLine {
                product_id: line.product.id.clone(),
            });
        }
    }

    let (total, item_count) = fold_totals(&snapshot.lines).ok_or_else(|| {
        ValidationError::OutOfRange {
            field: "total".to_string(),
            min: 0,
            max: i64::MAX,
        }
    })?;

    if total != snapshot.total {
        return Err(ValidationError::Inconsistent {
            field: "total".to_string(),
            stored: snapshot.total.cents(),
            computed: total.cents(),
        });
    }

    if item_count != snapshot.item_count {
        return Err(ValidationError::Inconsistent {
            field: "itemCount".to_string(),
            stored: i64::from(snapshot.item_count),
            computed: i64::from(item_count),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VariantSelection;

    fn hoodie() -> Product {
        Product::new("3", "Sudadera Nike Tech", Money::from_cents(8900), 25)
    }

    fn snapshot(lines: Vec<CartLine>) -> CartSnapshot {
        let total = lines.iter().map(CartLine::line_total).sum();
        let item_count = lines.iter().map(|l| l.quantity).sum();
        CartSnapshot {
            lines,
            total,
            item_count,
        }
    }

    #[test]
    fn test_validate_product() {
        assert!(validate_product(&hoodie()).is_ok());
        assert!(validate_product(&hoodie().with_discount(100)).is_ok());
        assert!(validate_product(&hoodie().with_discount(101)).is_err());

        let mut free = hoodie();
        free.price = Money::zero();
        assert!(validate_product(&free).is_ok());

        let mut unnamed = hoodie();
        unnamed.id = String::new();
        assert_eq!(
            validate_product(&unnamed),
            Err(ValidationError::Required {
                field: "id".to_string()
            })
        );
    }

    #[test]
    fn test_display_text_is_not_restricted() {
        let mut product = hoodie();
        product.id = "x".repeat(65);
        product.name = "x".repeat(201);
        assert!(validate_product(&product).is_ok());

        product.name = "   ".to_string();
        assert!(validate_product(&product).is_ok());
    }

    #[test]
    fn test_valid_snapshot() {
        let lines = vec![
            CartLine::new(hoodie(), 2, VariantSelection::none().size("M")),
            CartLine::new(hoodie(), 1, VariantSelection::none().size("L")),
        ];
        assert!(validate_snapshot(&snapshot(lines)).is_ok());
        assert!(validate_snapshot(&snapshot(Vec::new())).is_ok());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let lines = vec![
            CartLine::new(hoodie(), 2, VariantSelection::none().size("M")),
            CartLine::new(hoodie(), 1, VariantSelection::none().size("M")),
        ];
        assert!(matches!(
            validate_snapshot(&snapshot(lines)),
            Err(ValidationError::DuplicateLine { .. })
        ));
    }

    #[test]
    fn test_quantity_over_stock_rejected() {
        let lines = vec![CartLine::new(hoodie(), 26, VariantSelection::none())];
        assert!(validate_snapshot(&snapshot(lines)).is_err());
    }

    #[test]
    fn test_large_quantity_within_stock_accepted() {
        let mut bulk = hoodie();
        bulk.stock = 5000;
        let lines = vec![CartLine::new(bulk, 1500, VariantSelection::none())];
        assert!(validate_snapshot(&snapshot(lines)).is_ok());
    }

    #[test]
    fn test_overflowing_line_total_rejected() {
        let mut priceless = hoodie();
        priceless.price = Money::from_cents(i64::MAX);
        let snap = CartSnapshot {
            lines: vec![CartLine::new(priceless, 2, VariantSelection::none())],
            total: Money::zero(),
            item_count: 2,
        };

        assert!(matches!(
            validate_snapshot(&snap),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_item_count_mismatch_rejected() {
        let mut snap = snapshot(vec![CartLine::new(hoodie(), 2, VariantSelection::none())]);
        snap.item_count = 3;

        assert_eq!(
            validate_snapshot(&snap),
            Err(ValidationError::Inconsistent {
                field: "itemCount".to_string(),
                stored: 3,
                computed: 2,
            })
        );
    }
}
