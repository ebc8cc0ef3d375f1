//! # Checkout Planning
//!
//! The pure half of checkout: everything that can be decided before the
//! first write.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  plan_checkout (THIS MODULE, pure)                                      │
//! │    1. cart empty?               ──► EmptyCart                           │
//! │    2. subtotal, tax at channel rate                                     │
//! │    3. total = subtotal + tax − discount                                 │
//! │    4. cash: tendered >= total?  ──► InsufficientPayment                 │
//! │       change = tendered − total (0 for non-cash)                        │
//! │            │                                                            │
//! │            ▼                                                            │
//! │  OrderDraft ──► kopi-db record_checkout (one transaction)               │
//! │    5. order row   6. item rows   7. payment row                         │
//! │            │                                                            │
//! │            ▼                                                            │
//! │  8. ReceiptSnapshot   9. clear cart (kopi-pos)                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed plan performs no writes.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::CartLine;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::OrderTotals;
use crate::table::TableBinding;
use crate::types::{AddOnSnapshot, OrderChannel, OrderStatus, OrderType, PaymentMethod, TaxRate};

/// Payment as entered at the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentInput {
    pub method: PaymentMethod,
    /// Cash only. Ignored for other methods.
    pub tendered: Option<Money>,
}

impl PaymentInput {
    pub fn cash(tendered: Money) -> Self {
        PaymentInput {
            method: PaymentMethod::Cash,
            tendered: Some(tendered),
        }
    }

    pub fn non_cash(method: PaymentMethod) -> Self {
        PaymentInput {
            method,
            tendered: None,
        }
    }
}

/// One order item as it will be written, frozen from a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlannedItem {
    pub product_id: String,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub subtotal: Money,
    pub add_ons: Vec<AddOnSnapshot>,
    /// Customization label; `None` when nothing was selected.
    pub variant_details: Option<String>,
}

impl From<&CartLine> for PlannedItem {
    fn from(line: &CartLine) -> Self {
        PlannedItem {
            product_id: line.product_id.clone(),
            product_name: line.product_name.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            subtotal: line.line_total(),
            add_ons: line.customization.add_ons.clone(),
            variant_details: Some(line.label.clone()).filter(|l| !l.is_empty()),
        }
    }
}

/// Fully computed checkout, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutPlan {
    pub items: Vec<PlannedItem>,
    pub tax_rate: TaxRate,
    pub totals: OrderTotals,
    pub method: PaymentMethod,
    /// Cash only.
    pub tendered: Option<Money>,
    /// Zero for non-cash methods.
    pub change: Money,
}

/// Checkout steps 1 to 4.
///
/// ## Errors
/// - `EmptyCart` when `lines` is empty
/// - `InvalidDiscount` from [`OrderTotals::compute`]
/// - `InsufficientPayment` when cash tendered is below the total; missing
///   tendered cash counts as zero
///
/// ```rust
/// use kopi_core::cart::Cart;
/// use kopi_core::checkout::{plan_checkout, PaymentInput};
/// use kopi_core::money::Money;
/// use kopi_core::types::{Customization, TaxRate};
///
/// let mut cart = Cart::new();
/// cart.add_line("p1", "Americano", Money::from_cents(375), 2, Customization::default()).unwrap();
///
/// let plan = plan_checkout(
///     cart.lines(),
///     TaxRate::from_bps(1100),
///     Money::zero(),
///     PaymentInput::cash(Money::from_cents(1000)),
/// ).unwrap();
/// assert_eq!(plan.totals.total().cents(), 833);
/// assert_eq!(plan.change.cents(), 167);
/// ```
pub fn plan_checkout(
    lines: &[CartLine],
    tax_rate: TaxRate,
    discount: Money,
    payment: PaymentInput,
) -> CoreResult<CheckoutPlan> {
    if lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let items: Vec<PlannedItem> = lines.iter().map(PlannedItem::from).collect();
    let subtotal: Money = items.iter().map(|i| i.subtotal).sum();
    let totals = OrderTotals::compute(subtotal, tax_rate, discount)?;

    let (tendered, change) = if payment.method.is_cash() {
        let tendered = payment.tendered.unwrap_or_default();
        if tendered < totals.total() {
            return Err(CoreError::InsufficientPayment {
                required: totals.total().cents(),
                tendered: tendered.cents(),
            });
        }
        (Some(tendered), tendered - totals.total())
    } else {
        (None, Money::zero())
    };

    Ok(CheckoutPlan {
        items,
        tax_rate,
        totals,
        method: payment.method,
        tendered,
        change,
    })
}

/// Everything the persistence layer needs to record one checkout.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDraft {
    pub channel: OrderChannel,
    pub table: Option<TableBinding>,
    pub staff_id: Option<String>,
    pub notes: Option<String>,
    /// `pending`, or `completed` when payment at the counter closes the sale.
    pub initial_status: OrderStatus,
    pub plan: CheckoutPlan,
}

impl OrderDraft {
    /// Dine-in when bound to a table, otherwise takeaway.
    pub fn order_type(&self) -> OrderType {
        if self.table.is_some() {
            OrderType::DineIn
        } else {
            OrderType::Takeaway
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::Cart;
    use crate::types::Customization;

    fn latte_with_oat_milk() -> Cart {
        let mut cart = Cart::new();
        let custom = Customization {
            add_ons: vec![AddOnSnapshot {
                id: "oat".to_string(),
                name: "Oat Milk".to_string(),
                price_cents: 75,
            }],
            ..Default::default()
        };
        cart.add_line("latte", "Caffè Latte", Money::from_cents(450), 2, custom)
            .unwrap();
        cart
    }

    #[test]
    fn test_empty_cart_rejected() {
        let err = plan_checkout(
            &[],
            TaxRate::from_bps(1100),
            Money::zero(),
            PaymentInput::non_cash(PaymentMethod::Card),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
    }

    #[test]
    fn test_end_to_end_cash_plan() {
        let cart = latte_with_oat_milk();
        let plan = plan_checkout(
            cart.lines(),
            TaxRate::from_bps(1100),
            Money::zero(),
            PaymentInput::cash(Money::from_cents(1200)),
        )
        .unwrap();

        assert_eq!(plan.totals.subtotal().cents(), 1050);
        assert_eq!(plan.totals.tax().cents(), 116);
        assert_eq!(plan.totals.total().cents(), 1166);
        assert_eq!(plan.tendered, Some(Money::from_cents(1200)));
        assert_eq!(plan.change.cents(), 34);

        let item = &plan.items[0];
        assert_eq!(item.unit_price.cents(), 525);
        assert_eq!(item.subtotal.cents(), 1050);
        assert_eq!(item.variant_details.as_deref(), Some("Oat Milk"));
    }

    #[test]
    fn test_cash_below_total_rejected() {
        let cart = latte_with_oat_milk();
        let err = plan_checkout(
            cart.lines(),
            TaxRate::from_bps(1100),
            Money::zero(),
            PaymentInput::cash(Money::from_cents(1165)),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientPayment {
                required: 1166,
                tendered: 1165
            }
        ));
    }

    #[test]
    fn test_cash_without_tendered_counts_as_zero() {
        let cart = latte_with_oat_milk();
        let err = plan_checkout(
            cart.lines(),
            TaxRate::from_bps(1100),
            Money::zero(),
            PaymentInput {
                method: PaymentMethod::Cash,
                tendered: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InsufficientPayment { tendered: 0, .. }));
    }

    #[test]
    fn test_exact_cash_gives_zero_change() {
        let cart = latte_with_oat_milk();
        let plan = plan_checkout(
            cart.lines(),
            TaxRate::from_bps(1100),
            Money::zero(),
            PaymentInput::cash(Money::from_cents(1166)),
        )
        .unwrap();
        assert!(plan.change.is_zero());
    }

    #[test]
    fn test_non_cash_has_no_change() {
        let cart = latte_with_oat_milk();
        let plan = plan_checkout(
            cart.lines(),
            TaxRate::from_bps(1100),
            Money::zero(),
            PaymentInput {
                method: PaymentMethod::DigitalWallet,
                tendered: Some(Money::from_cents(5000)),
            },
        )
        .unwrap();
        assert_eq!(plan.tendered, None);
        assert!(plan.change.is_zero());
    }

    #[test]
    fn test_discount_reduces_total() {
        let cart = latte_with_oat_milk();
        let plan = plan_checkout(
            cart.lines(),
            TaxRate::from_bps(1100),
            Money::from_cents(166),
            PaymentInput::cash(Money::from_cents(1000)),
        )
        .unwrap();
        assert_eq!(plan.totals.total().cents(), 1000);
        assert!(plan.change.is_zero());
    }

    #[test]
    fn test_order_type_follows_table_binding() {
        let cart = latte_with_oat_milk();
        let plan = plan_checkout(
            cart.lines(),
            TaxRate::from_bps(1100),
            Money::zero(),
            PaymentInput::non_cash(PaymentMethod::Card),
        )
        .unwrap();
        let mut draft = OrderDraft {
            channel: OrderChannel::Pos,
            table: None,
            staff_id: None,
            notes: None,
            initial_status: OrderStatus::Pending,
            plan,
        };
        assert_eq!(draft.order_type(), OrderType::Takeaway);

        draft.table = Some(TableBinding {
            table_id: None,
            table_number: "4".to_string(),
        });
        assert_eq!(draft.order_type(), OrderType::DineIn);
    }
}
