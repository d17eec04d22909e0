//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, error types and the auth vocabulary
//! shared by the order and payment modules.

mod auth;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use auth::{Actor, AuthError, AuthenticatedUser, Role};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{
    MenuItemId, OrderId, OrderItemId, PaymentId, RestaurantId, TableId, UserId,
    WaiterAssignmentId,
};
pub use state_machine::{IllegalTransition, StateMachine};
pub use timestamp::Timestamp;
