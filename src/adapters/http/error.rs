//! Error responses for the order API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::DomainError;
use crate::domain::order::OrderError;

/// JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

/// API error type that converts order errors to HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub OrderError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            OrderError::NotFound { .. } | OrderError::NoCurrentOrder => StatusCode::NOT_FOUND,
            OrderError::OrderNotOpen
            | OrderError::OrderFinalized
            | OrderError::InvalidStatusTransition { .. }
            | OrderError::ConcurrentModification => StatusCode::CONFLICT,
            OrderError::ItemRestaurantMismatch
            | OrderError::EmptyPayload
            | OrderError::OrderPriceIsZero
            | OrderError::ValidationFailed { .. }
            | OrderError::InvalidWebhook(_) => StatusCode::BAD_REQUEST,
            OrderError::UserCannotEditStatus => StatusCode::UNAUTHORIZED,
            OrderError::UserCannotEditLockedOrder | OrderError::NotRestaurantWaiter(_) => {
                StatusCode::FORBIDDEN
            }
            OrderError::PaymentProvider(_) => StatusCode::BAD_GATEWAY,
            OrderError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(OrderError::from(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // storage details stay in the log
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "Request failed");
            "internal server error".to_string()
        } else {
            if self.0.is_server_fault() {
                tracing::warn!(error = %self.0, "Request failed");
            } else {
                tracing::debug!(error = %self.0, "Request rejected");
            }
            self.0.message()
        };

        let body = ErrorResponse::new(self.0.code().to_string(), message);
        (status, Json(body)).into_response()
    }
}
