//! Order-specific error types.
//!
//! | Error | HTTP |
//! |-------|------|
//! | `NotFound`, `NoCurrentOrder` | 404 |
//! | `OrderNotOpen`, `OrderFinalized`, `InvalidStatusTransition`, `ConcurrentModification` | 409 |
//! | `ItemRestaurantMismatch`, `EmptyPayload`, `OrderPriceIsZero`, `ValidationFailed`, `InvalidWebhook` | 400 |
//! | `UserCannotEditStatus` | 401 |
//! | `UserCannotEditLockedOrder`, `NotRestaurantWaiter` | 403 |
//! | `PaymentProvider` | 502 |
//! | `Repository` | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, UserId, ValidationError};

use super::OrderStatus;

/// Errors returned by the order engine and the payment orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// A referenced order, order item, menu item, table or assignment does
    /// not exist. `code` says which.
    NotFound { code: ErrorCode, message: String },
    /// The table has no current order.
    NoCurrentOrder,
    /// The menu item belongs to a different restaurant than the order.
    ItemRestaurantMismatch,
    /// Items can only change while the order is open.
    OrderNotOpen,
    /// The order is completed or cancelled.
    OrderFinalized,
    /// Update request carried neither a status nor a tip.
    EmptyPayload,
    /// Anonymous callers may only lock an order.
    UserCannotEditStatus,
    /// Status changes on a locked order need a waiter of the restaurant.
    UserCannotEditLockedOrder,
    /// The user is not a waiter of the order's restaurant.
    NotRestaurantWaiter(UserId),
    /// Requested status is not reachable from the current one.
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },
    /// The order changed between read and write.
    ConcurrentModification,
    /// Nothing to pay for.
    OrderPriceIsZero,
    /// Webhook payload or signature rejected.
    InvalidWebhook(String),
    /// The payment provider failed.
    PaymentProvider(String),
    /// Input validation failed.
    ValidationFailed { field: String, message: String },
    /// Storage failure.
    Repository(String),
}

impl OrderError {
    pub fn not_found(code: ErrorCode, message: impl Into<String>) -> Self {
        OrderError::NotFound {
            code,
            message: message.into(),
        }
    }
    pub fn invalid_transition(from: OrderStatus, to: OrderStatus) -> Self {
        OrderError::InvalidStatusTransition { from, to }
    }
    pub fn invalid_webhook(message: impl Into<String>) -> Self {
        OrderError::InvalidWebhook(message.into())
    }
    pub fn payment_provider(message: impl Into<String>) -> Self {
        OrderError::PaymentProvider(message.into())
    }
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        OrderError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn repository(message: impl Into<String>) -> Self {
        OrderError::Repository(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            OrderError::NotFound { code, .. } => *code,
            OrderError::NoCurrentOrder => ErrorCode::NoCurrentOrder,
            OrderError::ItemRestaurantMismatch => ErrorCode::ItemRestaurantMismatch,
            OrderError::OrderNotOpen => ErrorCode::OrderNotOpen,
            OrderError::OrderFinalized => ErrorCode::OrderFinalized,
            OrderError::EmptyPayload => ErrorCode::EmptyField,
            OrderError::UserCannotEditStatus => ErrorCode::Unauthorized,
            OrderError::UserCannotEditLockedOrder => ErrorCode::Forbidden,
            OrderError::NotRestaurantWaiter(_) => ErrorCode::NotRestaurantWaiter,
            OrderError::InvalidStatusTransition { .. } => ErrorCode::InvalidStateTransition,
            OrderError::ConcurrentModification => ErrorCode::ConcurrentModification,
            OrderError::OrderPriceIsZero => ErrorCode::OutOfRange,
            OrderError::InvalidWebhook(_) => ErrorCode::InvalidFormat,
            OrderError::PaymentProvider(_) => ErrorCode::ExternalServiceError,
            OrderError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            OrderError::Repository(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            OrderError::NotFound { message, .. } => message.clone(),
            OrderError::NoCurrentOrder => "current order for this table doesnt exist".to_string(),
            OrderError::ItemRestaurantMismatch => {
                "item does not belong to this restaurant".to_string()
            }
            OrderError::OrderNotOpen => "order is not open".to_string(),
            OrderError::OrderFinalized => {
                "order cannot be edited anymore since it's finalized".to_string()
            }
            OrderError::EmptyPayload => "payload is empty".to_string(),
            OrderError::UserCannotEditStatus => {
                "user cannot edit status of this order".to_string()
            }
            OrderError::UserCannotEditLockedOrder => {
                "this user cannot edit locked orders".to_string()
            }
            OrderError::NotRestaurantWaiter(user) => {
                format!("user {} is not a waiter of this restaurant", user)
            }
            OrderError::InvalidStatusTransition { from, to } => {
                format!("order cannot move from {} to {}", from, to)
            }
            OrderError::ConcurrentModification => {
                "order was modified concurrently, reload and retry".to_string()
            }
            OrderError::OrderPriceIsZero => "order total price and tip amount are 0".to_string(),
            OrderError::InvalidWebhook(msg) => format!("invalid webhook: {}", msg),
            OrderError::PaymentProvider(msg) => format!("payment provider error: {}", msg),
            OrderError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            OrderError::Repository(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true for failures caused by infrastructure rather than the caller.
    pub fn is_server_fault(&self) -> bool {
        matches!(
            self,
            OrderError::Repository(_) | OrderError::PaymentProvider(_)
        )
    }
}

impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for OrderError {}

impl From<DomainError> for OrderError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::NoCurrentOrder => OrderError::NoCurrentOrder,
            code if code.is_not_found() => OrderError::not_found(code, err.message),
            ErrorCode::OrderNotOpen => OrderError::OrderNotOpen,
            ErrorCode::OrderFinalized => OrderError::OrderFinalized,
            ErrorCode::ConcurrentModification => OrderError::ConcurrentModification,
            ErrorCode::ItemRestaurantMismatch => OrderError::ItemRestaurantMismatch,
            code if code.is_validation() => OrderError::ValidationFailed {
                field: err.field.unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::ExternalServiceError => OrderError::PaymentProvider(err.message),
            _ => OrderError::Repository(err.to_string()),
        }
    }
}

impl From<ValidationError> for OrderError {
    fn from(err: ValidationError) -> Self {
        OrderError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}
