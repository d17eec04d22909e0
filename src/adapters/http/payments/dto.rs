//! HTTP DTOs for payment endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{OrderId, PaymentId};
use crate::domain::payment::CheckoutSession;

/// Request to open a hosted checkout for an order.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCheckoutRequest {
    /// Where the provider sends the customer after paying.
    pub success_url: String,
    /// Where the provider sends the customer after abandoning.
    pub cancel_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckoutResponse {
    pub url: String,
    pub provider_session_id: String,
}

impl From<CheckoutSession> for CheckoutResponse {
    fn from(session: CheckoutSession) -> Self {
        Self {
            url: session.url,
            provider_session_id: session.provider_session_id,
        }
    }
}

/// Acknowledgement returned to the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookResponse {
    pub order_id: OrderId,
    pub payment_id: PaymentId,
}
