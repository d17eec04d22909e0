//! Status and tip updates, and the rules deciding who may apply them.
//!
//! An update passes three gates in order, first failure wins:
//!
//! 1. finalized orders reject everything;
//! 2. only staff may set a status other than `locked`;
//! 3. status changes on a `locked` order need staff who wait at the
//!    order's restaurant.
//!
//! Gate 3 needs a repository lookup, so [`EditPolicy::evaluate`] reports it
//! as a [`WaiterCheck`] for the caller to resolve. Once the gates pass,
//! [`EditPolicy::resolve_status`] checks the transition itself.

use crate::domain::foundation::{Actor, StateMachine, UserId, ValidationError};

use super::{OrderError, OrderStatus};

/// Tips must stay strictly below this many minor units.
pub const MAX_TIP_EXCLUSIVE: i64 = 20_000;

/// A validated request to change an order's status and/or tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderUpdate {
    status: Option<OrderStatus>,
    tip_amount_in_cents: Option<i64>,
}

impl OrderUpdate {
    /// Builds an update, rejecting empty payloads and out-of-range tips.
    pub fn new(
        status: Option<OrderStatus>,
        tip_amount_in_cents: Option<i64>,
    ) -> Result<Self, OrderError> {
        if status.is_none() && tip_amount_in_cents.is_none() {
            return Err(OrderError::EmptyPayload);
        }
        if let Some(tip) = tip_amount_in_cents {
            validate_tip(tip)?;
        }
        Ok(Self {
            status,
            tip_amount_in_cents,
        })
    }

    pub fn status(&self) -> Option<OrderStatus> {
        self.status
    }

    pub fn tip_amount_in_cents(&self) -> Option<i64> {
        self.tip_amount_in_cents
    }
}

/// Checks `0 <= tip < MAX_TIP_EXCLUSIVE`.
pub fn validate_tip(tip: i64) -> Result<(), ValidationError> {
    if !(0..MAX_TIP_EXCLUSIVE).contains(&tip) {
        return Err(ValidationError::out_of_range(
            "tip_amount_in_cents",
            0,
            MAX_TIP_EXCLUSIVE - 1,
            tip,
        ));
    }
    Ok(())
}

/// Outstanding authorization lookup after the pure gates pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaiterCheck {
    NotRequired,
    /// The user must be a waiter of the order's restaurant.
    Required(UserId),
}

/// Update authorization and transition rules.
pub struct EditPolicy;

impl EditPolicy {
    /// Runs the three gates against the order's current status.
    pub fn evaluate(
        current: OrderStatus,
        update: &OrderUpdate,
        actor: &Actor,
    ) -> Result<WaiterCheck, OrderError> {
        if current.is_finalized() {
            return Err(OrderError::OrderFinalized);
        }

        let requested = match update.status() {
            Some(status) => status,
            None => return Ok(WaiterCheck::NotRequired),
        };

        if requested != OrderStatus::Locked && !actor.is_authenticated() {
            return Err(OrderError::UserCannotEditStatus);
        }

        if current == OrderStatus::Locked {
            return match actor.user_id() {
                Some(user_id) => Ok(WaiterCheck::Required(user_id)),
                None => Err(OrderError::UserCannotEditLockedOrder),
            };
        }

        Ok(WaiterCheck::NotRequired)
    }

    /// Returns the status to write, or `None` when the status stays as is.
    pub fn resolve_status(
        current: OrderStatus,
        requested: Option<OrderStatus>,
    ) -> Result<Option<OrderStatus>, OrderError> {
        match requested {
            None => Ok(None),
            Some(target) if target == current => Ok(None),
            Some(target) => current
                .transition_to(target)
                .map(Some)
                .map_err(|illegal| OrderError::invalid_transition(illegal.from, illegal.to)),
        }
    }
}
