//! # Cart Events
//!
//! Advisory notifications emitted after each operation, meant for toasts
//! and similar UI feedback. Nothing in the engine depends on delivery.
//!
//! ```text
//! ┌──────────────┐   broadcast   ┌────────────────────────────┐
//! │  CartStore   │──────────────►│ receiver (toast renderer)  │
//! │  apply(op)   │               ├────────────────────────────┤
//! └──────────────┘               │ receiver (analytics)       │
//!                                └────────────────────────────┘
//!   A receiver that falls behind the channel capacity sees
//!   RecvError::Lagged and skips ahead; the cart itself is unaffected.
//! ```

use std::sync::Arc;

use cart_core::{CartOp, CartState, LineKey};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// What happened to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[ts(export)]
pub enum CartEventKind {
    /// Units of a product were added.
    #[serde(rename_all = "camelCase")]
    ItemAdded {
        product_id: String,
        product_name: String,
        /// Units actually added after stock clamping.
        quantity: u32,
    },
    #[serde(rename_all = "camelCase")]
    ItemRemoved { product_id: String },
    #[serde(rename_all = "camelCase")]
    QuantityUpdated { product_id: String, quantity: i64 },
    CartCleared,
}

impl CartEventKind {
    /// Human-readable message for the notification.
    pub fn message(&self) -> String {
        match self {
            CartEventKind::ItemAdded { product_name, .. } => {
                format!("Added to cart: {}", product_name)
            }
            CartEventKind::ItemRemoved { .. } => "Item removed".to_string(),
            CartEventKind::QuantityUpdated { .. } => "Quantity updated".to_string(),
            CartEventKind::CartCleared => "Cart cleared".to_string(),
        }
    }
}

/// A notification together with the cart it produced.
#[derive(Debug, Clone)]
pub struct CartEvent {
    pub kind: CartEventKind,
    pub state: Arc<CartState>,
}

impl CartEvent {
    pub fn message(&self) -> String {
        self.kind.message()
    }

    /// Describes the step `previous → next` caused by `op`.
    ///
    /// Adds that change nothing (non-positive quantity, invalid product,
    /// line already at stock) produce no event. Every other operation is
    /// reported even when it was an identity transition.
    pub fn for_transition(op: &CartOp, previous: &CartState, next: &Arc<CartState>) -> Option<Self> {
        let kind = match op {
            CartOp::AddItem {
                product,
                selection,
                ..
            } => {
                let key = LineKey::of(product, selection);
                let before = previous.line(key).map_or(0, |line| line.quantity);
                let after = next.line(key).map_or(0, |line| line.quantity);
                if after <= before {
                    return None;
                }
                CartEventKind::ItemAdded {
                    product_id: product.id.clone(),
                    product_name: product.name.clone(),
                    quantity: after - before,
                }
            }
            CartOp::RemoveItem { product_id } => CartEventKind::ItemRemoved {
                product_id: product_id.clone(),
            },
            CartOp::UpdateQuantity {
                product_id,
                quantity,
            } => CartEventKind::QuantityUpdated {
                product_id: product_id.clone(),
                quantity: *quantity,
            },
            CartOp::Clear => CartEventKind::CartCleared,
        };

        Some(CartEvent {
            kind,
            state: Arc::clone(next),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cart_core::{transition, Money, Product, VariantSelection};

    fn watch() -> Product {
        Product::new("5", "Apple Watch Ultra 2", Money::from_cents(89_900), 2)
    }

    fn step(previous: &CartState, op: &CartOp) -> Option<CartEvent> {
        let next = Arc::new(transition(previous, op));
        CartEvent::for_transition(op, previous, &next)
    }

    #[test]
    fn test_messages() {
        let added = CartEventKind::ItemAdded {
            product_id: "5".to_string(),
            product_name: "Apple Watch Ultra 2".to_string(),
            quantity: 1,
        };
        assert_eq!(added.message(), "Added to cart: Apple Watch Ultra 2");
        assert_eq!(CartEventKind::CartCleared.message(), "Cart cleared");
        assert_eq!(
            CartEventKind::ItemRemoved {
                product_id: "5".to_string()
            }
            .message(),
            "Item removed"
        );
    }

    #[test]
    fn test_add_reports_units_actually_added() {
        let empty = CartState::empty();
        let op = CartOp::add(watch(), 5, VariantSelection::none());

        let event = step(&empty, &op).unwrap();
        assert_eq!(
            event.kind,
            CartEventKind::ItemAdded {
                product_id: "5".to_string(),
                product_name: "Apple Watch Ultra 2".to_string(),
                quantity: 2,
            }
        );
        assert_eq!(event.state.item_count(), 2);
    }

    #[test]
    fn test_ineffective_add_is_silent() {
        let empty = CartState::empty();
        assert!(step(&empty, &CartOp::add(watch(), 0, VariantSelection::none())).is_none());

        let full = transition(&empty, &CartOp::add(watch(), 2, VariantSelection::none()));
        assert!(step(&full, &CartOp::add(watch(), 1, VariantSelection::none())).is_none());
    }

    #[test]
    fn test_identity_remove_still_reported() {
        let event = step(&CartState::empty(), &CartOp::remove("999")).unwrap();
        assert_eq!(event.message(), "Item removed");
    }

    #[test]
    fn test_kind_serializes_tagged() {
        let json = serde_json::to_value(CartEventKind::QuantityUpdated {
            product_id: "1".to_string(),
            quantity: 3,
        })
        .unwrap();

        assert_eq!(
            json,
            serde_json::json!({"kind": "quantityUpdated", "productId": "1", "quantity": 3})
        );
    }
}
