//! # Error Types
//!
//! Domain-specific error types for kopi-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kopi-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  kopi-db errors (separate crate)                                       │
//! │  └── DbError          - Persistence failures, partial writes           │
//! │                                                                         │
//! │  kopi-pos errors (app)                                                 │
//! │  ├── PosError         - Orchestration taxonomy                         │
//! │  └── ApiError         - What the front end sees (serialized)           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → PosError → ApiError → Front end   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `CoreError` is a precondition failure raised before any write.

use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout attempted with no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cash tendered below the order total.
    ///
    /// ## User Workflow
    /// ```text
    /// Total: $11.66, Cash tendered: $10.00
    ///      │
    ///      ▼
    /// InsufficientPayment { required: 1166, tendered: 1000 }
    ///      │
    ///      ▼
    /// UI shows: "Insufficient payment: required 1166, tendered 1000"
    /// ```
    #[error("Insufficient payment: required {required} cents, tendered {tendered} cents")]
    InsufficientPayment { required: i64, tendered: i64 },

    /// Status change not permitted by the order state machine.
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Cart line identity is unknown.
    #[error("Cart line not found: {0}")]
    LineNotFound(String),

    /// Cart has exceeded maximum allowed distinct lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Discount is negative or larger than subtotal + tax.
    #[error("Invalid discount of {discount} cents (maximum {max})")]
    InvalidDiscount { discount: i64, max: i64 },

    /// A scanned table QR payload could not be understood.
    #[error("Invalid table QR payload: {0}")]
    InvalidTablePayload(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
