//! # kopi-core: Pure Order-Lifecycle Logic for Sudut Kopi
//!
//! This crate is the **heart** of Sudut Kopi POS. It contains the order
//! lifecycle engine as pure functions and plain values with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Sudut Kopi POS Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Web Front End (menu, POS, admin)                   │   │
//! │  │    Menu ──► Cart ──► POS Checkout ──► Receipt ──► Admin        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ in-process calls                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kopi-pos (commands)                          │   │
//! │  │    checkout, update_order_status, daily_report, tables         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kopi-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌───────────┐ ┌──────────┐ ┌───────┐ │   │
//! │  │   │ pricing │ │  cart   │ │ lifecycle │ │ checkout │ │ sales │ │   │
//! │  │   └─────────┘ └─────────┘ └───────────┘ └──────────┘ └───────┘ │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌───────────┐ ┌──────────┐           │   │
//! │  │   │  money  │ │  types  │ │  receipt  │ │  table   │           │   │
//! │  │   └─────────┘ └─────────┘ └───────────┘ └──────────┘           │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kopi-db (Database Layer)                     │   │
//! │  │        SQLite queries, migrations, transactional checkout       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, AddOn, Order, OrderItem, Payment, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Unit prices, line totals, order totals
//! - [`cart`] - Session cart store
//! - [`lifecycle`] - Order status state machine
//! - [`checkout`] - Checkout planning (tax, discount, change)
//! - [`receipt`] - Immutable receipt snapshots and 58mm text layout
//! - [`sales`] - Sales aggregation over a time window
//! - [`table`] - Table QR payloads
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use kopi_core::money::Money;
//! use kopi_core::types::TaxRate;
//!
//! let subtotal = Money::from_cents(1050); // $10.50
//!
//! // POS channel tax is 11%, rounded half-up to the cent
//! let tax = subtotal.calculate_tax(TaxRate::from_bps(1100));
//! assert_eq!(tax.cents(), 116);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod pricing;
pub mod receipt;
pub mod sales;
pub mod table;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use checkout::{plan_checkout, CheckoutPlan, OrderDraft, PaymentInput};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{CartEstimate, OrderTotals};
pub use receipt::{ReceiptSnapshot, StoreHeader};
pub use sales::{ProductSales, SalesSummary, SalesWindow};
pub use table::TableBinding;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single cart line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Prefix of human-readable order numbers (`ORD-YYYYMMDD-NNNN`).
pub const ORDER_NUMBER_PREFIX: &str = "ORD";
