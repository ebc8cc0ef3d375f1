//! # Domain Types
//!
//! Core domain types used throughout Sudut Kopi POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  order_number   │   │  order_id (FK)  │       │
//! │  │  price_cents    │   │  status         │   │  method         │       │
//! │  │  category       │   │  total_cents    │   │  amount_cents   │       │
//! │  └─────────────────┘   └────────┬────────┘   └─────────────────┘       │
//! │                                 │ owns                                  │
//! │  ┌─────────────────┐   ┌────────▼────────┐   ┌─────────────────┐       │
//! │  │     AddOn       │   │   OrderItem     │   │  DiningTable    │       │
//! │  │  name, +price   │   │  frozen name,   │   │  table_number   │       │
//! │  └─────────────────┘   │  unit price     │   │  qr_code        │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Order → DiningTable is a weak reference (nullable id + number copy)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Enum string values match the database: `dine_in`, `digital_wallet`, ...

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1100 bps = 11% (POS counter), 800 bps = 8% (customer app estimate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (config/env convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Label used on receipts: `11%`, `8.25%`.
    pub fn label(&self) -> String {
        if self.0 % 100 == 0 {
            format!("{}%", self.0 / 100)
        } else {
            format!("{}%", self.percentage())
        }
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// A menu product. Reference data; catalog management is out of scope.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on the menu and on the receipt.
    pub name: String,

    pub description: Option<String>,

    /// Base price in cents, before add-ons.
    pub price_cents: i64,

    /// Menu category slug: `espresso`, `signature`, `manual-brew`, `pastries`.
    pub category: String,

    pub is_featured: bool,
    pub is_popular: bool,

    /// Inactive products stay in the table for historical order items.
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the base price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// An optional, price-additive modifier (Extra Espresso Shot, Oat Milk, ...).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AddOn {
    pub id: String,
    pub name: String,
    /// Price delta in cents, added to the unit price.
    pub price_cents: i64,
    pub is_active: bool,
}

impl AddOn {
    /// Freezes this add-on's name and price for a cart line.
    pub fn snapshot(&self) -> AddOnSnapshot {
        AddOnSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            price_cents: self.price_cents,
        }
    }
}

/// Add-on as captured on a cart line and stored on the order item.
///
/// Stored as a JSON array in `order_items.add_ons`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AddOnSnapshot {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
}

impl AddOnSnapshot {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Customization
// =============================================================================

/// Drink size. Informational only: it does not change the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Size {
    Small,
    Medium,
    Large,
}

impl Size {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Size::Small => "small",
            Size::Medium => "medium",
            Size::Large => "large",
        }
    }

    /// Capitalized label: `Medium`.
    pub const fn label(&self) -> &'static str {
        match self {
            Size::Small => "Small",
            Size::Medium => "Medium",
            Size::Large => "Large",
        }
    }
}

/// Hot or iced. Informational only: it does not change the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Temperature {
    Hot,
    Iced,
}

impl Temperature {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Temperature::Hot => "hot",
            Temperature::Iced => "iced",
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Temperature::Hot => "Hot",
            Temperature::Iced => "Iced",
        }
    }
}

/// The selections attached to one cart line.
///
/// Two cart additions merge only when product id and [`signature`] match.
///
/// [`signature`]: Customization::signature
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customization {
    pub size: Option<Size>,
    pub temperature: Option<Temperature>,
    pub add_ons: Vec<AddOnSnapshot>,
}

impl Customization {
    /// Identity of this selection, independent of add-on order.
    ///
    /// ```rust
    /// use kopi_core::types::{AddOnSnapshot, Customization, Size};
    ///
    /// let oat = AddOnSnapshot { id: "oat".into(), name: "Oat Milk".into(), price_cents: 75 };
    /// let shot = AddOnSnapshot { id: "shot".into(), name: "Extra Shot".into(), price_cents: 100 };
    ///
    /// let a = Customization { size: Some(Size::Large), temperature: None, add_ons: vec![oat.clone(), shot.clone()] };
    /// let b = Customization { size: Some(Size::Large), temperature: None, add_ons: vec![shot, oat] };
    /// assert_eq!(a.signature(), b.signature());
    /// ```
    pub fn signature(&self) -> String {
        let mut ids: Vec<&str> = self.add_ons.iter().map(|a| a.id.as_str()).collect();
        ids.sort_unstable();
        format!(
            "{}|{}|{}",
            self.size.map(|s| s.as_str()).unwrap_or("-"),
            self.temperature.map(|t| t.as_str()).unwrap_or("-"),
            ids.join(",")
        )
    }

    /// Display-only label: `Medium, Iced, Oat Milk`.
    ///
    /// Empty when nothing was selected.
    pub fn label(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(2 + self.add_ons.len());
        if let Some(size) = self.size {
            parts.push(size.label());
        }
        if let Some(temperature) = self.temperature {
            parts.push(temperature.label());
        }
        parts.extend(self.add_ons.iter().map(|a| a.name.as_str()));
        parts.join(", ")
    }

    /// Sum of the add-on price deltas.
    pub fn add_ons_total(&self) -> Money {
        self.add_ons.iter().map(AddOnSnapshot::price).sum()
    }
}

// =============================================================================
// Order Enums
// =============================================================================

/// Dine-in orders are bound to a table; everything else is takeaway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    DineIn,
    Takeaway,
}

impl OrderType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderType::DineIn => "dine_in",
            OrderType::Takeaway => "takeaway",
        }
    }

    /// Receipt label: `Dine In`, `Takeaway`.
    pub const fn label(&self) -> &'static str {
        match self {
            OrderType::DineIn => "Dine In",
            OrderType::Takeaway => "Takeaway",
        }
    }
}

/// The route by which an order was created.
///
/// Each channel has its own tax rate in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderChannel {
    /// Staff at the counter terminal.
    Pos,
    /// Customer self-service (menu app, table QR).
    Customer,
}

impl OrderChannel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderChannel::Pos => "pos",
            OrderChannel::Customer => "customer",
        }
    }
}

/// Order status. Transitions are defined in [`crate::lifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Enums
// =============================================================================

/// How the customer paid. Methods are recorded, never processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    DigitalWallet,
    BankTransfer,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::DigitalWallet => "digital_wallet",
            PaymentMethod::BankTransfer => "bank_transfer",
        }
    }

    /// Receipt label: underscores become spaces (`digital wallet`).
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }

    #[inline]
    pub const fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
    Refunded,
}

// =============================================================================
// Order
// =============================================================================

/// A persisted order.
///
/// ## Invariant
/// `total_cents = subtotal_cents + tax_cents - discount_cents`, all
/// non-negative. Totals come from [`crate::pricing::OrderTotals`], never
/// from user input.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// Human-readable `ORD-YYYYMMDD-NNNN`.
    pub order_number: String,
    pub order_type: OrderType,
    pub channel: OrderChannel,
    /// Weak reference; set to NULL when the table is deleted.
    pub table_id: Option<String>,
    /// Table number copied at checkout, survives table deletion.
    pub table_number: Option<String>,
    pub staff_id: Option<String>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub status: OrderStatus,
    pub notes: Option<String>,
    /// Optimistic concurrency counter, bumped on every status write.
    pub version: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line of a persisted order. Name and price are frozen at sale time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    /// NULL once the product is removed from the catalog.
    pub product_id: Option<String>,
    pub product_name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// unit_price_cents × quantity
    pub subtotal_cents: i64,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub add_ons: Vec<AddOnSnapshot>,
    /// Customization label, e.g. `Large, Iced, Oat Milk`.
    pub variant_details: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

/// A payment recorded against an order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub method: PaymentMethod,
    pub amount_cents: i64,
    pub status: PaymentStatus,
    /// Cash only: what the customer handed over.
    pub tendered_cents: Option<i64>,
    /// Cash only: tendered minus total.
    pub change_cents: Option<i64>,
    #[ts(as = "Option<String>")]
    pub paid_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Tables, Inventory, Reports
// =============================================================================

/// A dine-in table.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DiningTable {
    pub id: String,
    pub table_number: String,
    pub capacity: i64,
    /// `{origin}/pos?table={table_number}`
    pub qr_code: String,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Stock level for one product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryLevel {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub min_stock_level: i64,
    #[ts(as = "Option<String>")]
    pub last_restocked_at: Option<DateTime<Utc>>,
}

impl InventoryLevel {
    /// Low stock means strictly below the minimum level.
    #[inline]
    pub fn is_low(&self) -> bool {
        self.quantity < self.min_stock_level
    }
}

/// A closed-out day. One row per `report_date`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DailySalesReport {
    pub id: String,
    #[ts(as = "String")]
    pub report_date: NaiveDate,
    pub total_revenue_cents: i64,
    pub total_orders: i64,
    pub total_tax_cents: i64,
    pub total_discount_cents: i64,
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
