//! # cart-core: Pure Cart Logic
//!
//! This crate is the **heart** of the cart engine. It holds every rule about
//! what a cart may contain as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Engine Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 UI collaborators (catalog, cart page)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ add / remove / update / clear          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               cart-engine (CartStore: notify + persist)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ transition(state, op)                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cart-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  pricing  │  │   │
//! │  │   │  Product  │  │   Money   │  │ CartState │  │ Checkout  │  │   │
//! │  │   │ CartLine  │  │  TaxRate  │  │  CartOp   │  │  Summary  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CHANNELS • PURE FUNCTIONS          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product, cart line and variant selection
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart state, operations and the transition function
//! - [`pricing`] - Checkout summary (shipping, VAT, promo codes)
//! - [`validation`] - Product and snapshot validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use cart_core::{transition, CartOp, CartState, Money, Product, VariantSelection};
//!
//! let product = Product::new("1", "iPhone 15 Pro", Money::from_cents(119_900), 15);
//! let state = transition(
//!     &CartState::empty(),
//!     &CartOp::add(product, 2, VariantSelection::none()),
//! );
//!
//! assert_eq!(state.item_count(), 2);
//! assert_eq!(state.total().cents(), 239_800);
//! ```

pub mod cart;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

pub use cart::{transition, CartOp, CartSnapshot, CartState};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{CheckoutSummary, PricingPolicy, PromoCode};
pub use types::*;

/// Stock at or below this level is shown as "only N left".
pub const LOW_STOCK_THRESHOLD: u32 = 5;
