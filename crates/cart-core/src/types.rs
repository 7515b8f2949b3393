//! # Domain Types
//!
//! Core domain types used throughout the cart engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌─────────────────┐      │
//! │  │    Product      │   │    CartLine      │   │    LineKey      │      │
//! │  │  ─────────────  │   │  ──────────────  │   │  ─────────────  │      │
//! │  │  id             │──►│  product (copy)  │──►│  product_id     │      │
//! │  │  name, price    │   │  quantity ≥ 1    │   │  color?         │      │
//! │  │  stock          │   │  selected_color? │   │  size?          │      │
//! │  │  discount?      │   │  selected_size?  │   │                 │      │
//! │  └─────────────────┘   └──────────────────┘   └─────────────────┘      │
//! │                                                                         │
//! │  Product is supplied by the catalog collaborator and never mutated.    │
//! │  A CartLine freezes a copy of it at add-time.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::LOW_STOCK_THRESHOLD;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 2100 bps = 21% (Spanish IVA)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product offered by the catalog.
///
/// Only `id`, `name`, `price` and `stock` matter to cart math. The rest is
/// carried along so a cart line can be rendered without a catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Catalog identifier.
    pub id: String,

    /// Display name shown in the cart and in notifications.
    pub name: String,

    /// Unit price. Must not be negative.
    pub price: Money,

    /// Units available when the product was read from the catalog.
    pub stock: u32,

    /// Discount percentage (0-100), display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub discount: Option<u8>,

    /// Color variant labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub colors: Option<Vec<String>>,

    /// Size variant labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub sizes: Option<Vec<String>>,

    /// Merchandising tags ("Nuevo", "Bestseller", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub tags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub category: Option<String>,

    /// Image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub description: Option<String>,
}

impl Product {
    /// Creates a product with the fields cart math needs; everything else empty.
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money, stock: u32) -> Self {
        Product {
            id: id.into(),
            name: name.into(),
            price,
            stock,
            discount: None,
            colors: None,
            sizes: None,
            tags: None,
            category: None,
            image: None,
            description: None,
        }
    }

    /// Sets the discount percentage.
    pub fn with_discount(mut self, percent: u8) -> Self {
        self.discount = Some(percent);
        self
    }

    /// Sets the color variant labels.
    pub fn with_colors<I, S>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.colors = Some(colors.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the size variant labels.
    pub fn with_sizes<I, S>(mut self, sizes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sizes = Some(sizes.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the merchandising tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the catalog category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Price after the display discount.
    ///
    /// Cart totals never use this: the cart total is undiscounted and the
    /// discount badge is presentation.
    ///
    /// ```rust
    /// use cart_core::{Money, Product};
    ///
    /// let hoodie = Product::new("3", "Sudadera Nike Tech", Money::from_cents(8900), 25)
    ///     .with_discount(15);
    /// assert_eq!(hoodie.discounted_price().cents(), 7565);
    /// ```
    pub fn discounted_price(&self) -> Money {
        match self.discount {
            Some(pct) => self.price.apply_percentage_discount(u32::from(pct) * 100),
            None => self.price,
        }
    }

    /// Whether any unit can be added at all.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Whether the "only N left" warning applies.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= LOW_STOCK_THRESHOLD
    }
}

// =============================================================================
// Variant Selection
// =============================================================================

/// The color/size a shopper picked when adding a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VariantSelection {
    pub color: Option<String>,
    pub size: Option<String>,
}

impl VariantSelection {
    /// No variant picked.
    pub fn none() -> Self {
        VariantSelection::default()
    }

    /// Picks a color.
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Picks a size.
    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// Identity of a cart line: product id plus variant selection.
///
/// Two additions with the same key merge; different keys are separate lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineKey<'a> {
    pub product_id: &'a str,
    pub color: Option<&'a str>,
    pub size: Option<&'a str>,
}

impl<'a> LineKey<'a> {
    /// Builds the key an addition of `product` with `selection` would have.
    pub fn of(product: &'a Product, selection: &'a VariantSelection) -> Self {
        LineKey {
            product_id: &product.id,
            color: selection.color.as_deref(),
            size: selection.size.as_deref(),
        }
    }
}

/// One entry in the cart.
///
/// ## Invariants
/// - `quantity >= 1` for every line held by a `CartState`
/// - `product` is a frozen copy; later catalog changes don't affect it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub product: Product,

    pub quantity: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub selected_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub selected_size: Option<String>,
}

impl CartLine {
    /// Creates a line from a product snapshot.
    pub fn new(product: Product, quantity: u32, selection: VariantSelection) -> Self {
        CartLine {
            product,
            quantity,
            selected_color: selection.color,
            selected_size: selection.size,
        }
    }

    /// Returns this line's identity key.
    pub fn key(&self) -> LineKey<'_> {
        LineKey {
            product_id: &self.product.id,
            color: self.selected_color.as_deref(),
            size: self.selected_size.as_deref(),
        }
    }

    /// Product identifier (the key Remove/Update use).
    #[inline]
    pub fn product_id(&self) -> &str {
        &self.product.id
    }

    /// Unit price × quantity, undiscounted.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.product.price.multiply_quantity(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sneakers() -> Product {
        Product::new("4", "Zapatillas Air Jordan 1", Money::from_cents(16900), 12)
            .with_colors(["Negro/Rojo", "Chicago"])
            .with_sizes(["41", "42"])
    }

    #[test]
    fn test_line_key_includes_variants() {
        let product = sneakers();
        let red_41 = VariantSelection::none().color("Negro/Rojo").size("41");
        let red_42 = VariantSelection::none().color("Negro/Rojo").size("42");

        let a = CartLine::new(product.clone(), 1, red_41.clone());
        assert_eq!(a.key(), LineKey::of(&product, &red_41));
        assert_ne!(a.key(), LineKey::of(&product, &red_42));
        assert_ne!(a.key(), LineKey::of(&product, &VariantSelection::none()));
    }

    #[test]
    fn test_line_total() {
        let line = CartLine::new(sneakers(), 3, VariantSelection::none());
        assert_eq!(line.line_total().cents(), 50700);
    }

    #[test]
    fn test_stock_flags() {
        let mut product = sneakers();
        assert!(product.in_stock());
        assert!(!product.is_low_stock());

        product.stock = 5;
        assert!(product.is_low_stock());

        product.stock = 0;
        assert!(!product.in_stock());
    }

    #[test]
    fn test_product_json_omits_empty_optionals() {
        let product = Product::new("7", "Mochila", Money::from_cents(4500), 3);
        let json = serde_json::to_value(&product).unwrap();

        assert_eq!(json["price"], 4500);
        assert!(json.get("discount").is_none());
        assert!(json.get("colors").is_none());
    }

    #[test]
    fn test_line_json_uses_camel_case() {
        let line = CartLine::new(sneakers(), 1, VariantSelection::none().color("Chicago"));
        let json = serde_json::to_value(&line).unwrap();

        assert_eq!(json["selectedColor"], "Chicago");
        assert!(json.get("selectedSize").is_none());
    }
}
