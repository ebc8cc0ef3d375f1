//! # kopi-db: Database Layer for Sudut Kopi POS
//!
//! The persistence boundary. SQLite via sqlx, with the checkout written as
//! a single transaction and status changes guarded by the order state
//! machine plus an optimistic version check.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Sudut Kopi POS Data Flow                            │
//! │                                                                         │
//! │  kopi-pos command (checkout, update_order_status, daily_report)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kopi-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ CatalogRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ OrderRepo     │    │ 0001_initial │  │   │
//! │  │   │               │    │ TableRepo     │    │              │  │   │
//! │  │   │               │    │ InventoryRepo │    │              │  │   │
//! │  │   │               │    │ ReportRepo    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (platform data dir)/kopi.db                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kopi_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("kopi.db")).await?;
//! let recent = db.orders().list_recent(50).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{CheckoutStage, DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::catalog::CatalogRepository;
pub use repository::inventory::InventoryRepository;
pub use repository::order::{OrderDetail, OrderRepository, OrderSummary, RecordedCheckout};
pub use repository::report::ReportRepository;
pub use repository::table::TableRepository;
