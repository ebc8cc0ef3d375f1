//! # Order Lifecycle State Machine
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   pending ──► preparing ──► ready ──► completed                         │
//! │      │            │           │                                         │
//! │      └────────────┴───────────┴──────► cancelled                        │
//! │                                                                         │
//! │   completed, cancelled: terminal, nothing leaves them                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Transitions are triggered by staff (order management) or by the POS
//! checkout. There are no time-based transitions. The persistence layer
//! calls [`validate_transition`] before every status write, so an invalid
//! transition is never stored regardless of what the UI allowed.

use crate::error::{CoreError, CoreResult};
use crate::types::OrderStatus;

/// What a validated status request should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Write the new status.
    Apply,
    /// Already in the requested (non-terminal) status; nothing to write.
    NoOp,
}

impl OrderStatus {
    /// Statuses reachable in one step.
    pub const fn allowed_next(&self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pending => &[Preparing, Cancelled],
            Preparing => &[Ready, Cancelled],
            Ready => &[Completed, Cancelled],
            Completed | Cancelled => &[],
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Open orders are the kitchen queue shown on the dashboard.
    pub const fn is_open(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Preparing)
    }

    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        self.allowed_next().contains(&to)
    }
}

/// Checks a status change against the state machine.
///
/// ## Rules
/// - Any request from a terminal status fails, including the same status
/// - Same status on a non-terminal order is a no-op
/// - Otherwise `to` must be in `from.allowed_next()`
///
/// ```rust
/// use kopi_core::lifecycle::{validate_transition, Transition};
/// use kopi_core::types::OrderStatus;
///
/// assert_eq!(
///     validate_transition(OrderStatus::Pending, OrderStatus::Preparing).unwrap(),
///     Transition::Apply
/// );
/// assert!(validate_transition(OrderStatus::Completed, OrderStatus::Cancelled).is_err());
/// ```
pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> CoreResult<Transition> {
    if from.is_terminal() {
        return Err(CoreError::InvalidTransition { from, to });
    }
    if from == to {
        return Ok(Transition::NoOp);
    }
    if from.can_transition_to(to) {
        Ok(Transition::Apply)
    } else {
        Err(CoreError::InvalidTransition { from, to })
    }
}
