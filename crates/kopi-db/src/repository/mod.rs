//! # Repository Module
//!
//! Database repository implementations for Sudut Kopi POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  kopi-pos command                                                      │
//! │       │                                                                 │
//! │       │  db.orders().update_status(id, Preparing)                      │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── record_checkout(&self, draft)     one transaction                 │
//! │  ├── get_detail(&self, id)                                             │
//! │  ├── list_recent(&self, limit)                                         │
//! │  └── update_status(&self, id, to)      state machine + version check   │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`catalog::CatalogRepository`] - Products and add-ons
//! - [`order::OrderRepository`] - Checkout, order reads, status changes
//! - [`table::TableRepository`] - Dining tables and their QR payloads
//! - [`inventory::InventoryRepository`] - Stock levels
//! - [`report::ReportRepository`] - Closed-out daily sales

pub mod catalog;
pub mod inventory;
pub mod order;
pub mod report;
pub mod table;
