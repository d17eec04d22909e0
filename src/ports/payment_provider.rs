//! Hosted checkout provider port.
//!
//! The provider opens a checkout page for an order's current total and later
//! reports the successful charge through a signed webhook.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::payment::{CheckoutRequest, CheckoutSession, VerifiedPayment};

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Recorded on each payment row, e.g. `stripe`.
    fn name(&self) -> &str;

    /// Opens a checkout for the order snapshot and returns its redirect URL.
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    /// Checks the webhook signature and extracts the succeeded charge.
    ///
    /// Anything other than a verified success event is an error; see
    /// [`PaymentError::is_webhook_rejection`].
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<VerifiedPayment, PaymentError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("payment provider unreachable: {0}")]
    Unreachable(String),

    #[error("payment provider refused our credentials: {0}")]
    Unauthorized(String),

    #[error("payment provider is rate limiting: {0}")]
    RateLimited(String),

    /// The provider answered but refused or garbled the request.
    #[error("payment provider error: {message}")]
    Provider {
        message: String,
        provider_code: Option<String>,
    },

    #[error("webhook rejected: {0}")]
    InvalidWebhook(String),

    /// Authentic webhook for an event we do not act on.
    #[error("unhandled event type: {0}")]
    UnhandledEvent(String),
}

impl PaymentError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Unreachable(message.into())
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            provider_code: None,
        }
    }

    pub fn invalid_webhook(message: impl Into<String>) -> Self {
        Self::InvalidWebhook(message.into())
    }

    pub fn unhandled_event(event_type: &str) -> Self {
        Self::UnhandledEvent(event_type.to_string())
    }

    /// The webhook itself was bad, as opposed to the provider failing us.
    pub fn is_webhook_rejection(&self) -> bool {
        matches!(self, Self::InvalidWebhook(_) | Self::UnhandledEvent(_))
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::RateLimited(_))
    }

    /// Message without the variant prefix, for client-facing errors.
    pub fn detail(&self) -> String {
        match self {
            Self::Unreachable(m)
            | Self::Unauthorized(m)
            | Self::RateLimited(m)
            | Self::InvalidWebhook(m) => m.clone(),
            Self::Provider { message, .. } => message.clone(),
            Self::UnhandledEvent(_) => self.to_string(),
        }
    }
}
