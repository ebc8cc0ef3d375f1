//! # Sales Aggregation
//!
//! Read-only reductions over persisted orders and items. Nothing here
//! writes, so every function can be re-run at any time with the same
//! result.
//!
//! ## Report Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  orders in window with status S ──► summarize ──► SalesSummary          │
//! │                                       revenue   = Σ total               │
//! │                                       orders    = count                 │
//! │                                       tax       = Σ tax                 │
//! │                                       discount  = Σ discount            │
//! │                                       average   = revenue / count (0)   │
//! │                                                                         │
//! │  items of those orders ──► top_products(n) ──► [ProductSales]           │
//! │                             group by product name, sort by revenue desc │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Order, OrderItem, OrderStatus};

// =============================================================================
// Sales Window
// =============================================================================

/// A closed time interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesWindow {
    #[ts(as = "String")]
    pub start: DateTime<Utc>,
    #[ts(as = "String")]
    pub end: DateTime<Utc>,
}

impl SalesWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> CoreResult<Self> {
        if end < start {
            return Err(ValidationError::InvalidFormat {
                field: "window".to_string(),
                reason: "end is before start".to_string(),
            }
            .into());
        }
        Ok(SalesWindow { start, end })
    }

    /// The UTC calendar day: midnight to the last nanosecond before the
    /// next midnight.
    pub fn for_day(date: NaiveDate) -> Self {
        let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
        let end = start + Duration::days(1) - Duration::nanoseconds(1);
        SalesWindow { start, end }
    }

    #[inline]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

// =============================================================================
// Summary
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesSummary {
    pub window: SalesWindow,
    pub status: OrderStatus,
    pub revenue: Money,
    pub order_count: i64,
    pub tax: Money,
    pub discount: Money,
    /// `revenue / order_count` rounded half-up, zero for no orders.
    pub average_order: Money,
}

impl SalesSummary {
    /// CSV export: `Metric,Value` followed by one row per metric.
    pub fn to_csv(&self, currency_symbol: &str) -> String {
        [
            "Metric,Value".to_string(),
            format!("Total Revenue,{}", self.revenue.format_with(currency_symbol)),
            format!("Total Orders,{}", self.order_count),
            format!("Average Order,{}", self.average_order.format_with(currency_symbol)),
            format!("Total Tax,{}", self.tax.format_with(currency_symbol)),
            format!("Total Discount,{}", self.discount.format_with(currency_symbol)),
        ]
        .join("\n")
    }
}

/// Reduces the orders inside `window` with the given status.
///
/// Orders outside the window or with another status are ignored, so the
/// caller may pass a superset.
pub fn summarize(orders: &[Order], window: &SalesWindow, status: OrderStatus) -> SalesSummary {
    let matching = orders
        .iter()
        .filter(|o| o.status == status && window.contains(o.created_at));

    let mut revenue = Money::zero();
    let mut tax = Money::zero();
    let mut discount = Money::zero();
    let mut order_count = 0i64;
    for order in matching {
        revenue += order.total();
        tax += Money::from_cents(order.tax_cents);
        discount += Money::from_cents(order.discount_cents);
        order_count += 1;
    }

    SalesSummary {
        window: *window,
        status,
        revenue,
        order_count,
        tax,
        discount,
        average_order: average(revenue, order_count),
    }
}

fn average(revenue: Money, count: i64) -> Money {
    if count == 0 {
        return Money::zero();
    }
    Money::from_cents((revenue.cents() + count / 2) / count)
}

// =============================================================================
// Top Products
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductSales {
    pub product_name: String,
    pub quantity: i64,
    pub revenue: Money,
}

/// Groups items by product name and returns the `n` best by revenue.
///
/// Ties keep first-encountered order (stable sort).
///
/// ```rust
/// # use kopi_core::sales::top_products;
/// assert!(top_products(&[], 5).is_empty());
/// ```
pub fn top_products(items: &[OrderItem], n: usize) -> Vec<ProductSales> {
    let mut groups: Vec<ProductSales> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|g| g.product_name == item.product_name) {
            Some(group) => {
                group.quantity += item.quantity;
                group.revenue += item.subtotal();
            }
            None => groups.push(ProductSales {
                product_name: item.product_name.clone(),
                quantity: item.quantity,
                revenue: item.subtotal(),
            }),
        }
    }

    groups.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    groups.truncate(n);
    groups
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderChannel, OrderType};
    use chrono::TimeZone;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 14).unwrap()
    }

    fn order(total_cents: i64, status: OrderStatus, at: DateTime<Utc>) -> Order {
        Order {
            id: uuid::Uuid::new_v4().to_string(),
            order_number: "ORD".to_string(),
            order_type: OrderType::Takeaway,
            channel: OrderChannel::Pos,
            table_id: None,
            table_number: None,
            staff_id: None,
            subtotal_cents: total_cents,
            tax_cents: 0,
            discount_cents: 0,
            total_cents,
            status,
            notes: None,
            version: 1,
            created_at: at,
            updated_at: at,
        }
    }

    fn item(name: &str, quantity: i64, subtotal_cents: i64) -> OrderItem {
        OrderItem {
            id: uuid::Uuid::new_v4().to_string(),
            order_id: "o".to_string(),
            product_id: None,
            product_name: name.to_string(),
            unit_price_cents: subtotal_cents / quantity,
            quantity,
            subtotal_cents,
            add_ons: Vec::new(),
            variant_details: None,
            created_at: Utc::now(),
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_known_fixture() {
        let orders = vec![
            order(1000, OrderStatus::Completed, noon()),
            order(2000, OrderStatus::Completed, noon()),
            order(1500, OrderStatus::Completed, noon()),
        ];
        let summary = summarize(&orders, &SalesWindow::for_day(day()), OrderStatus::Completed);

        assert_eq!(summary.revenue.cents(), 4500);
        assert_eq!(summary.order_count, 3);
        assert_eq!(summary.average_order.cents(), 1500);
    }

    #[test]
    fn test_empty_fixture_average_is_zero() {
        let summary = summarize(&[], &SalesWindow::for_day(day()), OrderStatus::Completed);
        assert_eq!(summary.order_count, 0);
        assert!(summary.average_order.is_zero());
    }

    #[test]
    fn test_filters_status_and_window() {
        let yesterday = Utc.with_ymd_and_hms(2026, 1, 13, 23, 59, 59).unwrap();
        let orders = vec![
            order(1000, OrderStatus::Completed, noon()),
            order(9999, OrderStatus::Pending, noon()),
            order(9999, OrderStatus::Cancelled, noon()),
            order(9999, OrderStatus::Completed, yesterday),
        ];
        let summary = summarize(&orders, &SalesWindow::for_day(day()), OrderStatus::Completed);
        assert_eq!(summary.revenue.cents(), 1000);
        assert_eq!(summary.order_count, 1);
    }

    #[test]
    fn test_window_is_closed() {
        let window = SalesWindow::for_day(day());
        assert!(window.contains(Utc.with_ymd_and_hms(2026, 1, 14, 0, 0, 0).unwrap()));
        assert!(window.contains(window.end));
        assert!(!window.contains(Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap()));
        assert!(SalesWindow::new(window.end, window.start).is_err());
    }

    #[test]
    fn test_average_rounds_half_up() {
        let orders = vec![
            order(1000, OrderStatus::Completed, noon()),
            order(1001, OrderStatus::Completed, noon()),
        ];
        let summary = summarize(&orders, &SalesWindow::for_day(day()), OrderStatus::Completed);
        // 2001 / 2 = 1000.5 → 1001
        assert_eq!(summary.average_order.cents(), 1001);
    }

    #[test]
    fn test_top_products_groups_and_orders() {
        let items = vec![item("A", 2, 400), item("B", 1, 900), item("A", 1, 200)];
        let top = top_products(&items, 5);

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product_name, "B");
        assert_eq!(top[0].quantity, 1);
        assert_eq!(top[0].revenue.cents(), 900);
        assert_eq!(top[1].product_name, "A");
        assert_eq!(top[1].quantity, 3);
        assert_eq!(top[1].revenue.cents(), 600);
    }

    #[test]
    fn test_top_products_ties_keep_first_seen() {
        let items = vec![item("Croissant", 1, 300), item("Muffin", 1, 300), item("Latte", 1, 450)];
        let top = top_products(&items, 2);
        let names: Vec<&str> = top.iter().map(|p| p.product_name.as_str()).collect();
        assert_eq!(names, vec!["Latte", "Croissant"]);
    }

    #[test]
    fn test_csv_rows() {
        let orders = vec![order(1000, OrderStatus::Completed, noon())];
        let csv = summarize(&orders, &SalesWindow::for_day(day()), OrderStatus::Completed).to_csv("$");
        assert_eq!(
            csv,
            "Metric,Value\nTotal Revenue,$10.00\nTotal Orders,1\nAverage Order,$10.00\nTotal Tax,$0.00\nTotal Discount,$0.00"
        );
    }
}
