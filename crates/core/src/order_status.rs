//! Order lifecycle states and transition rules.
//!
//! ```text
//! pending -> confirmed -> preparing -> ready -> delivered
//!    \           \
//!     +-----------+-> cancelled
//! ```
//!
//! `delivered` and `cancelled` are terminal. Forward moves may skip
//! intermediate states; backward moves are refused.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status values
// ---------------------------------------------------------------------------

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_CONFIRMED: &str = "confirmed";
pub const STATUS_PREPARING: &str = "preparing";
pub const STATUS_READY: &str = "ready";
pub const STATUS_DELIVERED: &str = "delivered";
pub const STATUS_CANCELLED: &str = "cancelled";

/// All valid order statuses, in lifecycle order.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_CONFIRMED,
    STATUS_PREPARING,
    STATUS_READY,
    STATUS_DELIVERED,
    STATUS_CANCELLED,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Wire / database name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => STATUS_PENDING,
            OrderStatus::Confirmed => STATUS_CONFIRMED,
            OrderStatus::Preparing => STATUS_PREPARING,
            OrderStatus::Ready => STATUS_READY,
            OrderStatus::Delivered => STATUS_DELIVERED,
            OrderStatus::Cancelled => STATUS_CANCELLED,
        }
    }

    /// Terminal states accept no further changes.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Position on the forward path. `None` for `cancelled`, which sits
    /// outside the sequence.
    fn rank(self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Confirmed => Some(1),
            OrderStatus::Preparing => Some(2),
            OrderStatus::Ready => Some(3),
            OrderStatus::Delivered => Some(4),
            OrderStatus::Cancelled => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_PENDING => Ok(OrderStatus::Pending),
            STATUS_CONFIRMED => Ok(OrderStatus::Confirmed),
            STATUS_PREPARING => Ok(OrderStatus::Preparing),
            STATUS_READY => Ok(OrderStatus::Ready),
            STATUS_DELIVERED => Ok(OrderStatus::Delivered),
            STATUS_CANCELLED => Ok(OrderStatus::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Invalid order status '{other}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// The write a validated transition requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub status: OrderStatus,
    /// Set `preparation_started_at` to now.
    pub stamp_preparation_started: bool,
    /// Set `delivered_at` to now.
    pub stamp_delivered: bool,
}

/// Validate a move from `current` to `next` and describe the resulting write.
pub fn plan_transition(current: OrderStatus, next: OrderStatus) -> Result<StatusChange, CoreError> {
    if current.is_terminal() {
        return Err(CoreError::InvalidState(format!(
            "Cannot modify an order that is already {current}"
        )));
    }

    if next == OrderStatus::Cancelled {
        check_cancellable(current)?;
    } else {
        // Both ranks exist: `current` is not terminal and `next` is not cancelled.
        let forward = matches!((current.rank(), next.rank()), (Some(from), Some(to)) if to > from);
        if !forward {
            return Err(CoreError::InvalidState(format!(
                "Cannot move an order from '{current}' to '{next}'"
            )));
        }
    }

    Ok(StatusChange {
        status: next,
        stamp_preparation_started: next == OrderStatus::Preparing,
        stamp_delivered: next == OrderStatus::Delivered,
    })
}

/// Only `pending` and `confirmed` orders may be cancelled.
pub fn check_cancellable(current: OrderStatus) -> Result<(), CoreError> {
    match current {
        OrderStatus::Pending | OrderStatus::Confirmed => Ok(()),
        other => Err(CoreError::InvalidState(format!(
            "Cannot cancel an order that is {other}; only pending or confirmed orders can be cancelled"
        ))),
    }
}

/// Line items may only be changed while the order is `pending`.
pub fn check_items_editable(current: OrderStatus) -> Result<(), CoreError> {
    if current == OrderStatus::Pending {
        Ok(())
    } else {
        Err(CoreError::InvalidState(format!(
            "Only pending orders can be modified (order is {current})"
        )))
    }
}
