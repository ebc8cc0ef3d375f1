//! # Error Types
//!
//! `PosError` is what commands return; `ApiError` is what the front end
//! receives.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Sudut Kopi POS                         │
//! │                                                                         │
//! │  CoreError ──────────────────────────────┐                              │
//! │  (EmptyCart, InsufficientPayment,        │                              │
//! │   InvalidTransition, Validation, ...)    │                              │
//! │                                          ▼                              │
//! │  DbError ── PartialWrite ──────────► PosError::PartialCheckout         │
//! │         ── StaleWrite ─────────────► PosError::ConcurrentUpdate        │
//! │         ── Domain(CoreError) ──────► PosError::Core                    │
//! │         ── everything else ────────► PosError::Persistence             │
//! │                                          │                              │
//! │                                          ▼                              │
//! │                                  ApiError { code, message, retryable } │
//! │                                                                         │
//! │  try {                                                                  │
//! │    await checkout(...)                                                  │
//! │  } catch (e) {                                                          │
//! │    // e.code = "INSUFFICIENT_PAYMENT", e.retryable = false              │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;
use tracing::error;

use kopi_core::{CoreError, ValidationError};
use kopi_db::{CheckoutStage, DbError};

// =============================================================================
// PosError
// =============================================================================

/// Errors at the orchestration boundary.
#[derive(Debug, Error)]
pub enum PosError {
    /// A business rule rejected the request. Nothing was written.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Persistence(DbError),

    /// A checkout write failed after the order row. The cart is kept.
    #[error("Checkout failed while writing {stage} (rolled back: {rolled_back}): {reason}")]
    PartialCheckout {
        stage: CheckoutStage,
        rolled_back: bool,
        reason: String,
    },

    /// The order changed since it was read. Reload and try again.
    #[error("Order {order_id} was changed by someone else")]
    ConcurrentUpdate { order_id: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<DbError> for PosError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::PartialWrite {
                stage,
                rolled_back,
                message,
            } => PosError::PartialCheckout {
                stage,
                rolled_back,
                reason: message,
            },
            DbError::StaleWrite { id, .. } => PosError::ConcurrentUpdate { order_id: id },
            DbError::Domain(core) => PosError::Core(core),
            other => PosError::Persistence(other),
        }
    }
}

impl From<ValidationError> for PosError {
    fn from(err: ValidationError) -> Self {
        PosError::Core(err.into())
    }
}

pub type PosResult<T> = Result<T, PosError>;

// =============================================================================
// ApiError
// =============================================================================

/// Error returned to the front end.
///
/// ```json
/// {
///   "code": "INVALID_TRANSITION",
///   "message": "Cannot move order from completed to cancelled",
///   "retryable": false
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Whether showing a "try again" button makes sense.
    pub retryable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    EmptyCart,
    CartError,
    InsufficientPayment,
    InvalidTransition,
    /// Business rule not covered by a more specific code
    BusinessLogic,
    ConcurrentUpdate,
    PartialCheckout,
    DatabaseError,
    ConfigError,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>, retryable: bool) -> Self {
        ApiError {
            code,
            message: message.into(),
            retryable,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::EmptyCart => ErrorCode::EmptyCart,
            CoreError::InsufficientPayment { .. } => ErrorCode::InsufficientPayment,
            CoreError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            CoreError::LineNotFound(_) => ErrorCode::NotFound,
            CoreError::CartTooLarge { .. } | CoreError::QuantityTooLarge { .. } => ErrorCode::CartError,
            CoreError::InvalidDiscount { .. } => ErrorCode::BusinessLogic,
            CoreError::InvalidTablePayload(_) | CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        ApiError::new(code, err.to_string(), false)
    }
}

impl From<PosError> for ApiError {
    fn from(err: PosError) -> Self {
        match err {
            PosError::Core(core) => core.into(),
            PosError::PartialCheckout { .. } => {
                error!(error = %err, "Checkout partially failed");
                ApiError::new(ErrorCode::PartialCheckout, err.to_string(), false)
            }
            PosError::ConcurrentUpdate { .. } => {
                ApiError::new(ErrorCode::ConcurrentUpdate, err.to_string(), true)
            }
            PosError::Config(message) => ApiError::new(ErrorCode::ConfigError, message, false),
            PosError::Persistence(db) => match db {
                DbError::NotFound { entity, id } => ApiError::new(
                    ErrorCode::NotFound,
                    format!("{} not found: {}", entity, id),
                    false,
                ),
                DbError::UniqueViolation { field, .. } => ApiError::new(
                    ErrorCode::ValidationError,
                    format!("{} already exists", field),
                    false,
                ),
                DbError::ForeignKeyViolation { message } => {
                    error!("Foreign key violation: {}", message);
                    ApiError::new(ErrorCode::ValidationError, "Invalid reference", false)
                }
                other => {
                    // Log the actual error but return a generic message
                    error!(error = %other, "Database operation failed");
                    let retryable = other.is_transient();
                    ApiError::new(ErrorCode::DatabaseError, "Database operation failed", retryable)
                }
            },
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
