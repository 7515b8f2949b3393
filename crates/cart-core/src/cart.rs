//! # Cart State & Transitions
//!
//! The canonical cart value and the pure function that moves it forward.
//!
//! ## Transition Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    transition(state, op) -> state                       │
//! │                                                                         │
//! │  Operation                 Keyed by                 Effect              │
//! │  ─────────                 ────────                 ──────              │
//! │                                                                         │
//! │  AddItem(p, q, variant) ─► (id, color, size) ─────► merge or append     │
//! │                                                                         │
//! │  RemoveItem(id) ─────────► id only ──────────────► drop ALL variants    │
//! │                                                                         │
//! │  UpdateQuantity(id, q) ──► id only ──────────────► set q (q ≤ 0: drop)  │
//! │                                                                         │
//! │  Clear ─────────────────────────────────────────► empty cart            │
//! │                                                                         │
//! │  Every result is built through CartState::from_lines, which recomputes  │
//! │  total and item_count. Nothing else can set them.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Transitions never fail. Unknown ids, non-positive additions, invalid
//! products and steps whose totals would overflow all produce the unchanged
//! state.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{CartLine, LineKey, Product, VariantSelection};
use crate::validation::{validate_product, validate_snapshot};

// =============================================================================
// Cart State
// =============================================================================

/// The cart: ordered lines plus totals derived from them.
///
/// ## Invariants
/// - no two lines share a [`LineKey`]
/// - every line has `1 <= quantity`
/// - `total == Σ price × quantity`, `item_count == Σ quantity`
///
/// The fields are private, so every `CartState` in existence satisfies these.
/// Deserialization goes through [`CartSnapshot`] and is rejected when the
/// snapshot breaks any of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "CartSnapshot", try_from = "CartSnapshot")]
pub struct CartState {
    lines: Vec<CartLine>,
    total: Money,
    item_count: u32,
}

impl CartState {
    /// The empty cart: `{ lines: [], total: 0, itemCount: 0 }`.
    pub fn empty() -> Self {
        CartState {
            lines: Vec::new(),
            total: Money::zero(),
            item_count: 0,
        }
    }

    /// Builds a state from lines that already satisfy the line invariants,
    /// recomputing the derived fields. `None` when they don't fit.
    fn from_lines(lines: Vec<CartLine>) -> Option<Self> {
        let (total, item_count) = fold_totals(&lines)?;
        Some(CartState {
            lines,
            total,
            item_count,
        })
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Σ unit price × quantity (no discounts).
    pub fn total(&self) -> Money {
        self.total
    }

    /// Σ quantity.
    pub fn item_count(&self) -> u32 {
        self.item_count
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Finds the line with the given identity key.
    pub fn line(&self, key: LineKey<'_>) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.key() == key)
    }

    /// Units of a product across all its variant lines.
    pub fn quantity_of(&self, product_id: &str) -> u32 {
        self.lines
            .iter()
            .filter(|line| line.product_id() == product_id)
            .map(|line| line.quantity)
            .sum()
    }

    /// Whether any line holds this product.
    pub fn contains(&self, product_id: &str) -> bool {
        self.lines.iter().any(|line| line.product_id() == product_id)
    }
}

impl Default for CartState {
    fn default() -> Self {
        CartState::empty()
    }
}

/// `(Σ price × quantity, Σ quantity)`, or `None` if either leaves its type.
pub(crate) fn fold_totals(lines: &[CartLine]) -> Option<(Money, u32)> {
    lines
        .iter()
        .try_fold((Money::zero(), 0u32), |(total, count), line| {
            let line_total = line.product.price.checked_multiply_quantity(line.quantity)?;
            Some((total.checked_add(line_total)?, count.checked_add(line.quantity)?))
        })
}

// =============================================================================
// Snapshot (wire / storage shape)
// =============================================================================

/// Serialized form of a [`CartState`].
///
/// This is what gets written to storage and what the UI reads:
/// ```json
/// { "lines": [...], "total": 239800, "itemCount": 2 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    pub total: Money,
    pub item_count: u32,
}

impl From<CartState> for CartSnapshot {
    fn from(state: CartState) -> Self {
        CartSnapshot {
            lines: state.lines,
            total: state.total,
            item_count: state.item_count,
        }
    }
}

impl From<&CartState> for CartSnapshot {
    fn from(state: &CartState) -> Self {
        CartSnapshot::from(state.clone())
    }
}

impl TryFrom<CartSnapshot> for CartState {
    type Error = ValidationError;

    fn try_from(snapshot: CartSnapshot) -> Result<Self, Self::Error> {
        validate_snapshot(&snapshot)?;
        Ok(CartState {
            lines: snapshot.lines,
            total: snapshot.total,
            item_count: snapshot.item_count,
        })
    }
}

// =============================================================================
// Operations
// =============================================================================

/// A requested cart mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartOp {
    /// Add `quantity` units of `product` with the given variant selection.
    AddItem {
        product: Product,
        quantity: i64,
        selection: VariantSelection,
    },
    /// Remove every line of a product, whatever its variant.
    RemoveItem { product_id: String },
    /// Set the quantity of a product's line(s); `<= 0` removes.
    UpdateQuantity { product_id: String, quantity: i64 },
    /// Empty the cart.
    Clear,
}

impl CartOp {
    pub fn add(product: Product, quantity: i64, selection: VariantSelection) -> Self {
        CartOp::AddItem {
            product,
            quantity,
            selection,
        }
    }

    pub fn remove(product_id: impl Into<String>) -> Self {
        CartOp::RemoveItem {
            product_id: product_id.into(),
        }
    }

    pub fn update_quantity(product_id: impl Into<String>, quantity: i64) -> Self {
        CartOp::UpdateQuantity {
            product_id: product_id.into(),
            quantity,
        }
    }

    pub fn clear() -> Self {
        CartOp::Clear
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            CartOp::AddItem { .. } => "add_item",
            CartOp::RemoveItem { .. } => "remove_item",
            CartOp::UpdateQuantity { .. } => "update_quantity",
            CartOp::Clear => "clear_cart",
        }
    }
}

// =============================================================================
// Transition
// =============================================================================

/// Computes the next cart state. Pure: no I/O, no clock, no randomness.
///
/// ## Example
/// ```rust
/// use cart_core::{transition, CartOp, CartState, Money, Product, VariantSelection};
///
/// let hoodie = Product::new("3", "Sudadera Nike Tech", Money::from_cents(8900), 25);
/// let once = transition(&CartState::empty(), &CartOp::add(hoodie.clone(), 2, VariantSelection::none()));
/// let twice = transition(&once, &CartOp::add(hoodie, 1, VariantSelection::none()));
///
/// assert_eq!(twice.line_count(), 1);
/// assert_eq!(twice.item_count(), 3);
/// ```
pub fn transition(state: &CartState, op: &CartOp) -> CartState {
    match op {
        CartOp::AddItem {
            product,
            quantity,
            selection,
        } => add_item(state, product, *quantity, selection),
        CartOp::RemoveItem { product_id } => remove_item(state, product_id),
        CartOp::UpdateQuantity {
            product_id,
            quantity,
        } => update_quantity(state, product_id, *quantity),
        CartOp::Clear => CartState::empty(),
    }
}

/// Clamps a requested quantity into `0..=stock`.
fn clamp_quantity(requested: i64, stock: u32) -> u32 {
    requested.clamp(0, i64::from(stock)) as u32
}

/// The state for `lines`, or `state` unchanged when the totals overflow.
fn rebuild(state: &CartState, lines: Vec<CartLine>) -> CartState {
    CartState::from_lines(lines).unwrap_or_else(|| state.clone())
}

fn add_item(
    state: &CartState,
    product: &Product,
    quantity: i64,
    selection: &VariantSelection,
) -> CartState {
    if quantity <= 0 || validate_product(product).is_err() {
        return state.clone();
    }

    let key = LineKey::of(product, selection);
    let mut lines = state.lines.clone();

    match lines.iter().position(|line| line.key() == key) {
        Some(index) => {
            // The line keeps its frozen product, so both stocks bound it.
            let line = &mut lines[index];
            let merged = i64::from(line.quantity).saturating_add(quantity);
            let clamped = clamp_quantity(merged, line.product.stock.min(product.stock));
            if clamped == 0 {
                lines.remove(index);
            } else {
                line.quantity = clamped;
            }
        }
        None => {
            let clamped = clamp_quantity(quantity, product.stock);
            if clamped == 0 {
                return state.clone();
            }
            lines.push(CartLine::new(product.clone(), clamped, selection.clone()));
        }
    }

    rebuild(state, lines)
}

fn remove_item(state: &CartState, product_id: &str) -> CartState {
    if !state.contains(product_id) {
        return state.clone();
    }

    let lines = state
        .lines
        .iter()
        .filter(|line| line.product_id() != product_id)
        .cloned()
        .collect();
    rebuild(state, lines)
}

fn update_quantity(state: &CartState, product_id: &str, quantity: i64) -> CartState {
    if quantity <= 0 {
        return remove_item(state, product_id);
    }
    if !state.contains(product_id) {
        return state.clone();
    }

    // Every variant line of the product gets the new quantity.
    let lines = state
        .lines
        .iter()
        .filter_map(|line| {
            if line.product_id() != product_id {
                return Some(line.clone());
            }
            let clamped = clamp_quantity(quantity, line.product.stock);
            (clamped > 0).then(|| CartLine {
                quantity: clamped,
                ..line.clone()
            })
        })
        .collect();
    rebuild(state, lines)
}

// =============================================================================
// Unit Tests
// =============================================================================
