//! # Checkout Pricing
//!
//! Turns a cart total into the amounts shown on the cart and checkout pages.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Subtotal (3 items)                                   €267.00           │
//! │  Shipping                      free above €50.00  →   Free              │
//! │  VAT (21%)                     on subtotal        →   €56.07            │
//! │  Promo WELCOME10               10% of subtotal    →  -€26.70            │
//! │  ───────────────────────────────────────────────────────────            │
//! │  TOTAL                                                €296.37           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart's own `total` stays undiscounted; everything here is derived on
//! demand and never stored in the snapshot.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;

use crate::cart::CartState;
use crate::error::CoreError;
use crate::money::Money;
use crate::types::TaxRate;

// =============================================================================
// Pricing Policy
// =============================================================================

/// Store-wide pricing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// VAT applied to the subtotal.
    pub vat_rate: TaxRate,

    /// Flat shipping fee below the free-shipping threshold.
    pub standard_shipping: Money,

    /// Shipping is free when the subtotal is strictly above this.
    pub free_shipping_threshold: Money,
}

impl Default for PricingPolicy {
    /// 21% VAT, €4.99 shipping, free shipping above €50.00.
    fn default() -> Self {
        PricingPolicy {
            vat_rate: TaxRate::from_bps(2100),
            standard_shipping: Money::from_cents(499),
            free_shipping_threshold: Money::from_cents(5000),
        }
    }
}

impl PricingPolicy {
    /// Shipping fee for a given subtotal. An empty cart ships nothing.
    pub fn shipping_for(&self, subtotal: Money) -> Money {
        if subtotal.is_zero() || subtotal > self.free_shipping_threshold {
            Money::zero()
        } else {
            self.standard_shipping
        }
    }
}

// =============================================================================
// Promo Codes
// =============================================================================

/// A recognised promo code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PromoCode {
    /// 10% off the subtotal.
    Welcome10,
    /// 20% off the subtotal.
    Save20,
}

impl PromoCode {
    /// Discount in basis points.
    pub const fn discount_bps(&self) -> u32 {
        match self {
            PromoCode::Welcome10 => 1000,
            PromoCode::Save20 => 2000,
        }
    }

    /// The code as a shopper types it.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PromoCode::Welcome10 => "WELCOME10",
            PromoCode::Save20 => "SAVE20",
        }
    }
}

impl std::fmt::Display for PromoCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromoCode {
    type Err = CoreError;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "welcome10" => Ok(PromoCode::Welcome10),
            "save20" => Ok(PromoCode::Save20),
            _ => Err(CoreError::UnknownPromoCode(s.trim().to_string())),
        }
    }
}

// =============================================================================
// Checkout Summary
// =============================================================================

/// Amounts for the order summary panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CheckoutSummary {
    pub item_count: u32,
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub discount: Money,
    pub grand_total: Money,
    /// How much more to spend for free shipping (zero once reached).
    pub amount_to_free_shipping: Money,
    pub promo: Option<PromoCode>,
}

impl CheckoutSummary {
    /// Computes the summary for a cart.
    ///
    /// ```rust
    /// use cart_core::{transition, CartOp, CartState, CheckoutSummary, Money, PricingPolicy, Product, VariantSelection};
    ///
    /// let socks = Product::new("8", "Calcetines", Money::from_cents(1000), 50);
    /// let cart = transition(&CartState::empty(), &CartOp::add(socks, 2, VariantSelection::none()));
    ///
    /// let summary = CheckoutSummary::compute(&cart, &PricingPolicy::default(), None);
    /// assert_eq!(summary.shipping.cents(), 499);
    /// assert_eq!(summary.tax.cents(), 420);
    /// assert_eq!(summary.grand_total.cents(), 2000 + 499 + 420);
    /// ```
    pub fn compute(state: &CartState, policy: &PricingPolicy, promo: Option<PromoCode>) -> Self {
        let subtotal = state.total();
        let shipping = policy.shipping_for(subtotal);
        let tax = subtotal.calculate_tax(policy.vat_rate);
        let discount = promo
            .map(|code| subtotal.portion(code.discount_bps()))
            .unwrap_or_default();

        let amount_to_free_shipping = if subtotal > policy.free_shipping_threshold {
            Money::zero()
        } else {
            policy.free_shipping_threshold - subtotal
        };

        CheckoutSummary {
            item_count: state.item_count(),
            subtotal,
            shipping,
            tax,
            discount,
            grand_total: subtotal
                .saturating_add(shipping)
                .saturating_add(tax)
                .saturating_sub(discount),
            amount_to_free_shipping,
            promo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{transition, CartOp};
    use crate::types::{Product, VariantSelection};

    fn cart_worth(cents: i64) -> CartState {
        let item = Product::new("x", "Item", Money::from_cents(cents), 10);
        transition(&CartState::empty(), &CartOp::add(item, 1, VariantSelection::none()))
    }

    #[test]
    fn test_promo_parsing() {
        assert_eq!("welcome10".parse::<PromoCode>().unwrap(), PromoCode::Welcome10);
        assert_eq!(" SAVE20 ".parse::<PromoCode>().unwrap(), PromoCode::Save20);

        let err = "FREESTUFF".parse::<PromoCode>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown promo code: FREESTUFF");
    }

    #[test]
    fn test_shipping_threshold_is_strict() {
        let policy = PricingPolicy::default();
        assert_eq!(policy.shipping_for(Money::from_cents(5000)).cents(), 499);
        assert!(policy.shipping_for(Money::from_cents(5001)).is_zero());
    }

    #[test]
    fn test_summary_with_free_shipping_and_promo() {
        let cart = cart_worth(26700);
        let summary = CheckoutSummary::compute(&cart, &PricingPolicy::default(), Some(PromoCode::Welcome10));

        assert!(summary.shipping.is_zero());
        assert_eq!(summary.tax.cents(), 5607);
        assert_eq!(summary.discount.cents(), 2670);
        assert_eq!(summary.grand_total.cents(), 26700 + 5607 - 2670);
        assert!(summary.amount_to_free_shipping.is_zero());
    }

    #[test]
    fn test_summary_for_small_cart() {
        let summary = CheckoutSummary::compute(&cart_worth(3000), &PricingPolicy::default(), None);

        assert_eq!(summary.amount_to_free_shipping.cents(), 2000);
        assert!(summary.discount.is_zero());
    }

    #[test]
    fn test_summary_for_empty_cart() {
        let summary = CheckoutSummary::compute(&CartState::empty(), &PricingPolicy::default(), Some(PromoCode::Save20));

        assert_eq!(summary.item_count, 0);
        assert!(summary.grand_total.is_zero());
    }
}
