//! Lifecycle state machines.
//!
//! A lifecycle enum lists the states reachable from each state; checking and
//! performing a move are derived from that table.

use std::fmt;

/// A move the lifecycle table does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IllegalTransition<S> {
    pub from: S,
    pub to: S,
}

impl<S: fmt::Debug> fmt::Display for IllegalTransition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot move from {:?} to {:?}", self.from, self.to)
    }
}

impl<S: fmt::Debug> std::error::Error for IllegalTransition<S> {}

/// Status enums whose legal moves are a fixed table.
///
/// ```ignore
/// let next = OrderStatus::Open.transition_to(OrderStatus::Locked)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + fmt::Debug + 'static {
    /// States reachable in one move from `self`.
    fn successors(&self) -> &'static [Self];

    fn can_transition_to(&self, target: &Self) -> bool {
        self.successors().contains(target)
    }

    fn transition_to(&self, target: Self) -> Result<Self, IllegalTransition<Self>> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(IllegalTransition {
                from: *self,
                to: target,
            })
        }
    }

    /// No moves leave a terminal state.
    fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }
}
