//! # Cart Money
//!
//! Every amount in a cart (unit price, line total, cart total, tax,
//! shipping) is a whole number of euro cents.
//!
//! ```text
//!   89.99 × 3 in f64   = 269.96999999999997   total drifts from the fold
//!   8999 × 3 in cents  = 26997                 exact, round-trips through JSON
//! ```
//!
//! Rounding happens in exactly one place, [`Money::portion`], which every
//! percentage (VAT, promo, product discount) goes through.
//!
//! ## Usage
//! ```rust
//! use cart_core::money::Money;
//!
//! let price = Money::from_cents(8999); // €89.99
//! let line_total = price.multiply_quantity(3);
//! assert_eq!(line_total.cents(), 26997);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (euro cents).
///
/// Serialized as a bare integer, so a snapshot stores `"total": 239800`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use cart_core::money::Money;
    ///
    /// let price = Money::from_cents(1199); // €11.99
    /// assert_eq!(price.cents(), 1199);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole euros and cents.
    ///
    /// For negative amounts only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -€5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-euro portion.
    #[inline]
    pub const fn euros(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cent portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Negative amounts never appear in a valid cart.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Unit price × line quantity: €89.00 × 3 = €267.00.
    ///
    /// Saturates at the `i64` bounds. Cart totals go through
    /// [`Money::checked_multiply_quantity`] instead.
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }

    /// Unit price × line quantity, `None` if the result leaves `i64`.
    ///
    /// ```rust
    /// use cart_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(8900).checked_multiply_quantity(2), Some(Money::from_cents(17800)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_multiply_quantity(2), None);
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: u32) -> Option<Self> {
        match self.0.checked_mul(qty as i64) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// `self + other`, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// `self + other`, clamped to the `i64` range.
    #[inline]
    pub const fn saturating_add(&self, other: Money) -> Self {
        Money(self.0.saturating_add(other.0))
    }

    /// `self - other`, clamped to the `i64` range.
    #[inline]
    pub const fn saturating_sub(&self, other: Money) -> Self {
        Money(self.0.saturating_sub(other.0))
    }

    /// Returns `bps` basis points of this amount, rounded half up to the cent.
    ///
    /// Uses i128 so large carts cannot overflow mid-calculation.
    ///
    /// ```rust
    /// use cart_core::money::Money;
    ///
    /// // 10% of €24.99 = €2.499 → €2.50
    /// assert_eq!(Money::from_cents(2499).portion(1000).cents(), 250);
    /// ```
    pub fn portion(&self, bps: u32) -> Money {
        let cents = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }

    /// Calculates tax on this amount.
    ///
    /// ```rust
    /// use cart_core::money::Money;
    /// use cart_core::types::TaxRate;
    ///
    /// // €100.00 at 21% VAT = €21.00
    /// let tax = Money::from_cents(10000).calculate_tax(TaxRate::from_bps(2100));
    /// assert_eq!(tax.cents(), 2100);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        self.portion(rate.bps())
    }

    /// The amount left after taking `discount_bps` off (1500 = 15% off).
    pub fn apply_percentage_discount(&self, discount_bps: u32) -> Money {
        *self - self.portion(discount_bps)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display. Localised formatting belongs to the UI.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}€{}.{:02}", sign, self.euros().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Folding line totals into a cart total.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1199);
        assert_eq!(money.cents(), 1199);
        assert_eq!(money.euros(), 11);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(4, 99).cents(), 499);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(119_900).to_string(), "€1199.00");
        assert_eq!(Money::from_cents(499).to_string(), "€4.99");
        assert_eq!(Money::from_cents(-550).to_string(), "-€5.50");
        assert_eq!(Money::zero().to_string(), "€0.00");
    }

    #[test]
    fn test_sum_of_line_totals() {
        let lines = [
            Money::from_cents(8900).multiply_quantity(2),
            Money::from_cents(16900).multiply_quantity(1),
        ];
        let total: Money = lines.into_iter().sum();
        assert_eq!(total.cents(), 34700);

        let empty: Money = std::iter::empty::<Money>().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_overflow_is_detected_or_saturated() {
        let huge = Money::from_cents(i64::MAX);

        assert_eq!(huge.checked_multiply_quantity(2), None);
        assert_eq!(huge.checked_add(Money::from_cents(1)), None);
        assert_eq!(huge.multiply_quantity(2), huge);
        assert_eq!(huge.saturating_add(Money::from_cents(1)), huge);
        assert_eq!(
            Money::from_cents(i64::MIN).saturating_sub(Money::from_cents(1)).cents(),
            i64::MIN
        );
    }

    #[test]
    fn test_vat_rounding() {
        // €4.99 at 21% = €1.0479 → €1.05
        let tax = Money::from_cents(499).calculate_tax(TaxRate::from_bps(2100));
        assert_eq!(tax.cents(), 105);
    }

    #[test]
    fn test_percentage_discount() {
        // 15% off €89.00 = €75.65
        let discounted = Money::from_cents(8900).apply_percentage_discount(1500);
        assert_eq!(discounted.cents(), 7565);
    }
}
