//! Validation and port-level errors shared by every domain module.

use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Rejected input, always naming the field at fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

/// Stable codes shared by repositories, handlers and the HTTP error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ValidationFailed,
    EmptyField,
    OutOfRange,
    InvalidFormat,

    OrderNotFound,
    OrderItemNotFound,
    MenuItemNotFound,
    TableNotFound,
    AssignmentNotFound,
    NoCurrentOrder,

    OrderNotOpen,
    OrderFinalized,
    InvalidStateTransition,
    ConcurrentModification,
    ItemRestaurantMismatch,
    PaymentAlreadyRecorded,

    Unauthorized,
    Forbidden,
    NotRestaurantWaiter,

    ExternalServiceError,
    DatabaseError,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::OutOfRange => "OUT_OF_RANGE",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::OrderNotFound => "ORDER_NOT_FOUND",
            ErrorCode::OrderItemNotFound => "ORDER_ITEM_NOT_FOUND",
            ErrorCode::MenuItemNotFound => "MENU_ITEM_NOT_FOUND",
            ErrorCode::TableNotFound => "TABLE_NOT_FOUND",
            ErrorCode::AssignmentNotFound => "ASSIGNMENT_NOT_FOUND",
            ErrorCode::NoCurrentOrder => "NO_CURRENT_ORDER",
            ErrorCode::OrderNotOpen => "ORDER_NOT_OPEN",
            ErrorCode::OrderFinalized => "ORDER_FINALIZED",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::ConcurrentModification => "CONCURRENT_MODIFICATION",
            ErrorCode::ItemRestaurantMismatch => "ITEM_RESTAURANT_MISMATCH",
            ErrorCode::PaymentAlreadyRecorded => "PAYMENT_ALREADY_RECORDED",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotRestaurantWaiter => "NOT_RESTAURANT_WAITER",
            ErrorCode::ExternalServiceError => "EXTERNAL_SERVICE_ERROR",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ErrorCode::OrderNotFound
                | ErrorCode::OrderItemNotFound
                | ErrorCode::MenuItemNotFound
                | ErrorCode::TableNotFound
                | ErrorCode::AssignmentNotFound
                | ErrorCode::NoCurrentOrder
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ErrorCode::ValidationFailed
                | ErrorCode::EmptyField
                | ErrorCode::OutOfRange
                | ErrorCode::InvalidFormat
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported across the port boundary.
///
/// Repositories return this; the application layer folds it into
/// `OrderError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    /// Offending input field, for validation codes.
    pub field: Option<String>,
}

impl DomainError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn database(context: &str, err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, format!("{}: {}", context, err))
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        Self {
            code: ErrorCode::ValidationFailed,
            message: err.to_string(),
            field: Some(err.field().to_string()),
        }
    }
}
