//! # Pricing Model
//!
//! Pure functions turning catalog prices into line and order totals.
//!
//! ## Price Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  base price ──┐                                                         │
//! │               ├──► unit_price = base + Σ add-on deltas                  │
//! │  add-ons    ──┘          │   (fixed when the cart line is created)      │
//! │                          ▼                                              │
//! │               line_total = unit_price × quantity                        │
//! │                          │                                              │
//! │                          ▼                                              │
//! │               subtotal = Σ line_total                                   │
//! │                          │                                              │
//! │                          ▼                                              │
//! │               OrderTotals::compute(subtotal, tax rate, discount)        │
//! │                 tax   = round_half_up(subtotal × rate)                  │
//! │                 total = subtotal + tax − discount                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Size and temperature never change the price.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{AddOnSnapshot, TaxRate};

/// `base + Σ add-on price`.
pub fn unit_price(base: Money, add_ons: &[AddOnSnapshot]) -> Money {
    base + add_ons.iter().map(AddOnSnapshot::price).sum::<Money>()
}

/// `unit × quantity`.
#[inline]
pub fn line_total(unit: Money, quantity: i64) -> Money {
    unit.multiply_quantity(quantity)
}

// =============================================================================
// Order Totals
// =============================================================================

/// Monetary fields of an order.
///
/// The only constructor is [`OrderTotals::compute`], so a value of this
/// type always satisfies `total = subtotal + tax - discount` with every
/// field non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotals {
    subtotal: Money,
    tax: Money,
    discount: Money,
    total: Money,
}

impl OrderTotals {
    /// Computes tax and total from a subtotal.
    ///
    /// ## Errors
    /// - `InvalidDiscount` when the discount is negative or exceeds
    ///   `subtotal + tax`.
    /// - `Validation` when the subtotal is negative.
    ///
    /// ```rust
    /// use kopi_core::money::Money;
    /// use kopi_core::pricing::OrderTotals;
    /// use kopi_core::types::TaxRate;
    ///
    /// let totals = OrderTotals::compute(
    ///     Money::from_cents(1050),
    ///     TaxRate::from_bps(1100),
    ///     Money::zero(),
    /// ).unwrap();
    /// assert_eq!(totals.tax().cents(), 116);
    /// assert_eq!(totals.total().cents(), 1166);
    /// ```
    pub fn compute(subtotal: Money, rate: TaxRate, discount: Money) -> CoreResult<Self> {
        crate::validation::validate_price_cents(subtotal.cents())?;

        let tax = subtotal.calculate_tax(rate);
        let gross = subtotal + tax;

        if discount.is_negative() || discount > gross {
            return Err(CoreError::InvalidDiscount {
                discount: discount.cents(),
                max: gross.cents(),
            });
        }

        Ok(Self {
            subtotal,
            tax,
            discount,
            total: gross - discount,
        })
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    #[inline]
    pub fn tax(&self) -> Money {
        self.tax
    }

    #[inline]
    pub fn discount(&self) -> Money {
        self.discount
    }

    #[inline]
    pub fn total(&self) -> Money {
        self.total
    }
}

// =============================================================================
// Cart Estimate
// =============================================================================

/// What the customer cart page shows before checkout.
///
/// Uses the customer channel rate, which may differ from the POS rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartEstimate {
    pub item_count: i64,
    pub subtotal: Money,
    pub tax_rate: TaxRate,
    pub tax: Money,
    pub total: Money,
}

impl CartEstimate {
    pub fn from_cart(cart: &Cart, rate: TaxRate) -> Self {
        let subtotal = cart.total_price();
        let tax = subtotal.calculate_tax(rate);
        Self {
            item_count: cart.total_items(),
            subtotal,
            tax_rate: rate,
            tax,
            total: subtotal + tax,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Customization;

    fn oat_milk() -> AddOnSnapshot {
        AddOnSnapshot {
            id: "oat".to_string(),
            name: "Oat Milk".to_string(),
            price_cents: 75,
        }
    }

    #[test]
    fn test_unit_price_adds_add_ons() {
        let shot = AddOnSnapshot {
            id: "shot".to_string(),
            name: "Extra Espresso Shot".to_string(),
            price_cents: 100,
        };
        let unit = unit_price(Money::from_cents(450), &[oat_milk(), shot]);
        assert_eq!(unit.cents(), 625);
        assert_eq!(unit_price(Money::from_cents(450), &[]).cents(), 450);
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(Money::from_cents(525), 2).cents(), 1050);
    }

    #[test]
    fn test_totals_end_to_end_rounding() {
        // $4.50 latte + $0.75 oat milk, ×2, 11% tax
        let subtotal = line_total(unit_price(Money::from_cents(450), &[oat_milk()]), 2);
        let totals = OrderTotals::compute(subtotal, TaxRate::from_bps(1100), Money::zero()).unwrap();

        assert_eq!(totals.subtotal().cents(), 1050);
        assert_eq!(totals.tax().cents(), 116);
        assert_eq!(totals.total().cents(), 1166);
    }

    #[test]
    fn test_totals_invariant_with_discount() {
        let totals = OrderTotals::compute(
            Money::from_cents(2000),
            TaxRate::from_bps(1100),
            Money::from_cents(500),
        )
        .unwrap();
        assert_eq!(
            totals.total(),
            totals.subtotal() + totals.tax() - totals.discount()
        );
        assert_eq!(totals.total().cents(), 1720);
    }

    #[test]
    fn test_discount_bounds() {
        let rate = TaxRate::from_bps(1100);
        let err = OrderTotals::compute(Money::from_cents(1000), rate, Money::from_cents(-1)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDiscount { .. }));

        // Discount equal to subtotal + tax is allowed (total 0)
        let totals = OrderTotals::compute(Money::from_cents(1000), rate, Money::from_cents(1110)).unwrap();
        assert!(totals.total().is_zero());

        let err = OrderTotals::compute(Money::from_cents(1000), rate, Money::from_cents(1111)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDiscount { max: 1110, .. }));
    }

    #[test]
    fn test_cart_estimate_uses_given_rate() {
        let mut cart = Cart::new();
        cart.add_line("latte", "Caffè Latte", Money::from_cents(450), 2, Customization::default())
            .unwrap();

        let estimate = CartEstimate::from_cart(&cart, TaxRate::from_bps(800));
        assert_eq!(estimate.item_count, 2);
        assert_eq!(estimate.subtotal.cents(), 900);
        assert_eq!(estimate.tax.cents(), 72);
        assert_eq!(estimate.total.cents(), 972);
    }
}
