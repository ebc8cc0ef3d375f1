//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  A latte with oat milk, two of them, 11% tax, in floating point:       │
//! │    (4.50 + 0.75) × 2 = 10.5                                             │
//! │    10.5 × 0.11       = 1.1550000000000002  ❌ drift                     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    (450 + 75) × 2    = 1050 cents                                       │
//! │    tax               = round_half_up(1050 × 1100 / 10000) = 116 cents   │
//! │    Exactly one rounding step, at the tax line, nowhere else.            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kopi_core::money::Money;
//!
//! let latte = Money::from_cents(450);        // $4.50
//! let oat_milk = Money::from_cents(75);      // $0.75
//!
//! let unit = latte + oat_milk;               // $5.25
//! assert_eq!(unit.multiply_quantity(2).cents(), 1050);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  Product.price_cents + Σ AddOn.price_cents ──► CartLine.unit_price      │
/// │                                                    │                    │
/// │                                       × quantity ──► line subtotal      │
/// │                                                                         │
/// │  Cart.total_price ──► OrderTotals (tax, discount) ──► Payment.amount    │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use kopi_core::money::Money;
    ///
    /// let price = Money::from_cents(450); // Represents $4.50
    /// assert_eq!(price.cents(), 450);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// ## Example
    /// ```rust
    /// use kopi_core::money::Money;
    ///
    /// let price = Money::from_major_minor(3, 75); // $3.75
    /// assert_eq!(price.cents(), 375);
    /// ```
    ///
    /// For negative amounts only the major unit carries the sign.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax, rounding half-up to the nearest cent.
    ///
    /// ## Rounding Rule
    /// ```text
    /// tax_cents = (amount_cents × bps + 5000) / 10000
    ///
    /// 1050 cents × 11%  = 115.5  → 116
    ///  450 cents × 8%   =  36.0  →  36
    /// 1000 cents × 8.25% = 82.5  →  83
    /// ```
    /// The +5000 is half of the 10000 bps denominator, so exact halves
    /// always round away from zero for non-negative amounts. This is the
    /// only place in the system where a monetary value is rounded.
    ///
    /// ## Example
    /// ```rust
    /// use kopi_core::money::Money;
    /// use kopi_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(1050);
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(1100));
    /// assert_eq!(tax.cents(), 116);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 so large subtotals cannot overflow the intermediate product
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use kopi_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(525);
    /// assert_eq!(unit_price.multiply_quantity(2).cents(), 1050);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Formats the amount with a currency symbol, e.g. `$11.66`.
    ///
    /// Used for receipts and CSV exports where the store's configured
    /// symbol replaces the default `$`.
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money as dollars, e.g. `$4.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with("$"))
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

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
