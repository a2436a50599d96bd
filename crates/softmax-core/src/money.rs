//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A cart total summed in floats drifts by fractions of a centavo,       │
//! │  and the ledger no longer equals the sum of its lines.                 │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    15000 × 2 + 3000 = 33000 cents, exactly MZN 330.00                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use softmax_core::money::Money;
//!
//! let price = Money::from_cents(15000); // 150.00
//! let total = price * 2 + Money::from_cents(3000);
//!
//! assert_eq!(total.cents(), 33000);
//! assert_eq!(total.to_string(), "330.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (centavos).
///
/// ## Where Money is Used
/// ```text
/// Product.price_cents ──► CartLine.line_total() ──► Cart.total()
///                                                      │
///                                   Sale.total_cents ◄─┘
///                                         │
///                      Report totals ◄────┴────► Receipt "TOTAL: MZN x.xx"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use softmax_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole units and cents.
    ///
    /// ## Example
    /// ```rust
    /// use softmax_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(150, 0).cents(), 15000);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
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

    /// Returns the whole-unit portion.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use softmax_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Divides by a count, truncating toward zero. Zero count yields zero.
    ///
    /// Used for the report's average ticket, where an empty range must
    /// not divide by zero.
    ///
    /// ## Example
    /// ```rust
    /// use softmax_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1000).divide_by(3).cents(), 333);
    /// assert_eq!(Money::from_cents(1000).divide_by(0).cents(), 0);
    /// ```
    pub fn divide_by(&self, count: i64) -> Self {
        if count == 0 {
            return Money::zero();
        }
        Money(self.0 / count)
    }

    /// Formats with a currency prefix: `"MZN 330.00"`.
    ///
    /// ## Example
    /// ```rust
    /// use softmax_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(33000).format_with("MZN"), "MZN 330.00");
    /// assert_eq!(Money::from_cents(-550).format_with("R$"), "R$ -5.50");
    /// ```
    pub fn format_with(&self, symbol: &str) -> String {
        format!("{} {}", symbol, self)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain two-decimal rendering, matching `Number.toFixed(2)`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.units().abs(), self.cents_part())
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.units(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(0).to_string(), "0.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(15000);
        let b = Money::from_cents(3000);

        assert_eq!((a * 2 + b).cents(), 33000);
        assert_eq!((a - b).cents(), 12000);

        let mut acc = Money::zero();
        acc += a;
        assert_eq!(acc, a);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, 650]
            .into_iter()
            .map(Money::from_cents)
            .sum();
        assert_eq!(total.cents(), 1000);

        let empty: Money = std::iter::empty().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_divide_by_zero_count_is_zero() {
        assert_eq!(Money::from_cents(33000).divide_by(0), Money::zero());
        assert_eq!(Money::from_cents(33000).divide_by(2).cents(), 16500);
    }

    #[test]
    fn test_format_with_symbol() {
        assert_eq!(Money::from_cents(15000).format_with("MZN"), "MZN 150.00");
        assert_eq!(Money::from_cents(1234).format_with("R$"), "R$ 12.34");
    }
}
