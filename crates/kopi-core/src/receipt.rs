//! # Receipt Snapshot
//!
//! An owned, fully computed record of a sale, built once at checkout from
//! the rows that were just committed. Later status changes to the order do
//! not touch a snapshot that was already produced.
//!
//! ## 58mm Layout (32 columns)
//! ```text
//! ┌────────────────────────────────┐
//! │           SUDUT KOPI           │
//! │        Jl. Kopi No. 123        │
//! │      Tel: (021) 1234-5678      │
//! │--------------------------------│
//! │Order: ORD-20260114-0001        │
//! │Date: 2026-01-14                │
//! │Time: 08:30                     │
//! │Type: Takeaway                  │
//! │--------------------------------│
//! │Item              Qty     Price │
//! │Caffè Latte         2    $10.50 │
//! │  Oat Milk                      │
//! │--------------------------------│
//! │Subtotal:                $10.50 │
//! │Tax (11%):                $1.16 │
//! │TOTAL:                   $11.66 │
//! │--------------------------------│
//! │Payment:                   cash │
//! │Paid:                    $12.00 │
//! │Change:                   $0.34 │
//! │   Thank you for your order!    │
//! └────────────────────────────────┘
//! ```
//! Printing is handled by the front end's print collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Order, OrderItem, OrderType, Payment, PaymentMethod, TaxRate};

/// Narrowest width the layout supports.
pub const MIN_RECEIPT_WIDTH: usize = 24;

const QTY_COLUMN: usize = 4;
const PRICE_COLUMN: usize = 10;

/// Store details printed at the top and bottom of every receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StoreHeader {
    pub name: String,
    pub address_lines: Vec<String>,
    pub phone: Option<String>,
    pub footer_lines: Vec<String>,
    pub currency_symbol: String,
}

impl Default for StoreHeader {
    fn default() -> Self {
        StoreHeader {
            name: "SUDUT KOPI".to_string(),
            address_lines: vec!["Jl. Kopi No. 123".to_string()],
            phone: Some("(021) 1234-5678".to_string()),
            footer_lines: vec![
                "Thank you for your order!".to_string(),
                "Please come again".to_string(),
                "Powered by Sudut Kopi POS".to_string(),
            ],
            currency_symbol: "$".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptLine {
    pub name: String,
    pub variant_details: Option<String>,
    pub quantity: i64,
    pub line_total: Money,
}

/// Everything a receipt needs, by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptSnapshot {
    pub store: StoreHeader,
    pub order_id: String,
    pub order_number: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub order_type: OrderType,
    pub table_number: Option<String>,
    pub items: Vec<ReceiptLine>,
    pub subtotal: Money,
    pub tax_rate: TaxRate,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    /// Cash only.
    pub tendered: Option<Money>,
    /// Cash only.
    pub change: Option<Money>,
}

impl ReceiptSnapshot {
    /// Copies the committed rows into a snapshot.
    pub fn build(
        store: &StoreHeader,
        order: &Order,
        items: &[OrderItem],
        payment: &Payment,
        tax_rate: TaxRate,
    ) -> Self {
        ReceiptSnapshot {
            store: store.clone(),
            order_id: order.id.clone(),
            order_number: order.order_number.clone(),
            created_at: order.created_at,
            order_type: order.order_type,
            table_number: order.table_number.clone(),
            items: items
                .iter()
                .map(|i| ReceiptLine {
                    name: i.product_name.clone(),
                    variant_details: i.variant_details.clone(),
                    quantity: i.quantity,
                    line_total: i.subtotal(),
                })
                .collect(),
            subtotal: Money::from_cents(order.subtotal_cents),
            tax_rate,
            tax: Money::from_cents(order.tax_cents),
            discount: Money::from_cents(order.discount_cents),
            total: order.total(),
            payment_method: payment.method,
            tendered: payment.tendered_cents.map(Money::from_cents),
            change: payment.change_cents.map(Money::from_cents),
        }
    }

    /// Renders the fixed-width text layout. Widths below
    /// [`MIN_RECEIPT_WIDTH`] are raised to it.
    pub fn render_text(&self, width: usize) -> String {
        let width = width.max(MIN_RECEIPT_WIDTH);
        let symbol = self.store.currency_symbol.as_str();
        let rule = "-".repeat(width);
        let mut out: Vec<String> = Vec::new();

        // Header
        out.push(center(&self.store.name, width));
        for line in &self.store.address_lines {
            out.push(center(line, width));
        }
        if let Some(phone) = &self.store.phone {
            out.push(center(&format!("Tel: {}", phone), width));
        }
        out.push(rule.clone());

        // Order meta
        out.push(fit(&format!("Order: {}", self.order_number), width));
        out.push(format!("Date: {}", self.created_at.format("%Y-%m-%d")));
        out.push(format!("Time: {}", self.created_at.format("%H:%M")));
        out.push(format!("Type: {}", self.order_type.label()));
        if let Some(table) = &self.table_number {
            out.push(fit(&format!("Table: {}", table), width));
        }
        out.push(rule.clone());

        // Items
        let name_width = width - QTY_COLUMN - PRICE_COLUMN;
        out.push(format!(
            "{}{:>q$}{:>p$}",
            pad_right("Item", name_width),
            "Qty",
            "Price",
            q = QTY_COLUMN,
            p = PRICE_COLUMN
        ));
        for item in &self.items {
            out.push(format!(
                "{}{:>q$}{:>p$}",
                pad_right(&item.name, name_width),
                item.quantity,
                item.line_total.format_with(symbol),
                q = QTY_COLUMN,
                p = PRICE_COLUMN
            ));
            if let Some(details) = &item.variant_details {
                out.push(fit(&format!("  {}", details), width));
            }
        }
        out.push(rule.clone());

        // Totals
        out.push(two_columns("Subtotal:", &self.subtotal.format_with(symbol), width));
        out.push(two_columns(
            &format!("Tax ({}):", self.tax_rate.label()),
            &self.tax.format_with(symbol),
            width,
        ));
        if !self.discount.is_zero() {
            out.push(two_columns(
                "Discount:",
                &format!("-{}", self.discount.format_with(symbol)),
                width,
            ));
        }
        out.push(two_columns("TOTAL:", &self.total.format_with(symbol), width));
        out.push(rule);

        // Payment
        out.push(two_columns("Payment:", &self.payment_method.label(), width));
        if let Some(tendered) = self.tendered {
            out.push(two_columns("Paid:", &tendered.format_with(symbol), width));
        }
        if let Some(change) = self.change {
            out.push(two_columns("Change:", &change.format_with(symbol), width));
        }

        // Footer
        for line in &self.store.footer_lines {
            out.push(center(line, width));
        }

        out.join("\n")
    }
}

// =============================================================================
// Layout Helpers (char-based: names like "Caffè" are multi-byte)
// =============================================================================

fn fit(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn pad_right(text: &str, width: usize) -> String {
    let text = fit(text, width.saturating_sub(1));
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width - len))
}

fn center(text: &str, width: usize) -> String {
    let text = fit(text, width);
    let pad = (width - text.chars().count()) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

fn two_columns(left: &str, right: &str, width: usize) -> String {
    let right = fit(right, width);
    let right_len = right.chars().count();
    let left = fit(left, width.saturating_sub(right_len + 1));
    let gap = width - left.chars().count() - right_len;
    format!("{}{}{}", left, " ".repeat(gap), right)
}
