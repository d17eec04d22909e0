//! Order status state machine.
//!
//! ```text
//! open ──lock──▶ locked ──complete──▶ completed
//!   │              │
//!   └────cancel────┴──────cancel────▶ cancelled
//! ```
//!
//! `completed` and `cancelled` are terminal. Items may only change while the
//! order is `open`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{StateMachine, ValidationError};

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Customers and staff may add or remove items.
    Open,

    /// Submitted by the table; waiting for staff to settle it.
    Locked,

    /// Paid or closed out by staff.
    Completed,

    /// Abandoned.
    Cancelled,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Open,
        OrderStatus::Locked,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Returns true once no further mutation is permitted.
    pub fn is_finalized(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Returns true while items may be added or removed.
    pub fn accepts_item_changes(&self) -> bool {
        matches!(self, OrderStatus::Open)
    }

    /// Returns true if a successful payment may settle an order in this state.
    pub fn can_settle_by_payment(&self) -> bool {
        matches!(self, OrderStatus::Open | OrderStatus::Locked)
    }

    /// Database and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::Locked => "locked",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl StateMachine for OrderStatus {
    fn successors(&self) -> &'static [Self] {
        use OrderStatus::*;
        match self {
            Open => &[Locked, Cancelled],
            Locked => &[Completed, Cancelled],
            Completed | Cancelled => &[],
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(OrderStatus::Open),
            "locked" => Ok(OrderStatus::Locked),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown order status '{}'", other),
            )),
        }
    }
}
