//! # Validation Module
//!
//! Input validation utilities for Sudut Kopi POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web front end                                                 │
//! │  ├── Quantity steppers, disabled buttons                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: kopi-core (Rust)                                             │
//! │  ├── THIS MODULE: field checks                                         │
//! │  └── cart / lifecycle / checkout business rules                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints on money columns                                │
//! │  ├── UNIQUE order_number, table_number, report_date                    │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ```rust
/// use kopi_core::validation::validate_quantity;
///
/// assert!(validate_quantity(2).is_ok());
/// assert!(validate_quantity(0).is_err());
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

/// Validates a table capacity (1-50 seats).
pub fn validate_capacity(capacity: i64) -> ValidationResult<()> {
    if !(1..=50).contains(&capacity) {
        return Err(ValidationError::OutOfRange {
            field: "capacity".to_string(),
            min: 1,
            max: 50,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a table number and returns it trimmed.
///
/// ## Rules
/// - Must not be empty
/// - At most 20 characters
/// - Letters, digits, `-` and `_` only (it ends up in a URL)
pub fn validate_table_number(number: &str) -> ValidationResult<String> {
    let number = number.trim();

    if number.is_empty() {
        return Err(ValidationError::Required {
            field: "table_number".to_string(),
        });
    }

    if number.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "table_number".to_string(),
            max: 20,
        });
    }

    if !number
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "table_number".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(number.to_string())
}

/// Validates free-form order notes. Blank notes become `None`.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(notes) = notes.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    if notes.len() > 500 {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: 500,
        });
    }

    Ok(Some(notes.to_string()))
}

// =============================================================================
// Selection Validators
// =============================================================================

/// Validates an add-on selection. Each add-on may be chosen once.
///
/// ```rust
/// use kopi_core::validation::validate_add_on_ids;
///
/// assert!(validate_add_on_ids(&["oat", "shot"]).is_ok());
/// assert!(validate_add_on_ids(&["oat", "oat"]).is_err());
/// ```
pub fn validate_add_on_ids<S: AsRef<str>>(ids: &[S]) -> ValidationResult<()> {
    for (i, id) in ids.iter().enumerate() {
        if ids[..i].iter().any(|seen| seen.as_ref() == id.as_ref()) {
            return Err(ValidationError::InvalidFormat {
                field: "add_on_ids".to_string(),
                reason: format!("{} selected more than once", id.as_ref()),
            });
        }
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ```rust
/// use kopi_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
