//! Payment records and checkout requests.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{OrderId, PaymentId, Timestamp, ValidationError};
use crate::domain::order::Order;

/// A successful payment as recorded after provider verification.
///
/// Immutable once saved. `provider_payment_id` is unique per provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub amount_in_cents: i64,
    pub currency: String,
    pub provider: String,
    pub provider_payment_id: String,
    pub created_at: Timestamp,
}

/// Payment data extracted from a verified provider webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPayment {
    pub order_id: OrderId,
    pub amount_in_cents: i64,
    pub currency: String,
    pub provider: String,
    pub provider_payment_id: String,
}

impl VerifiedPayment {
    /// Assigns an id and timestamp for persistence.
    pub fn into_payment(self) -> Payment {
        Payment {
            id: PaymentId::new(),
            order_id: self.order_id,
            amount_in_cents: self.amount_in_cents,
            currency: self.currency,
            provider: self.provider,
            provider_payment_id: self.provider_payment_id,
            created_at: Timestamp::now(),
        }
    }
}

/// Where the provider sends the customer after checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutUrls {
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutUrls {
    /// Both URLs are required.
    pub fn new(
        success_url: impl Into<String>,
        cancel_url: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let success_url = success_url.into();
        let cancel_url = cancel_url.into();
        if success_url.trim().is_empty() {
            return Err(ValidationError::empty_field("success_url"));
        }
        if cancel_url.trim().is_empty() {
            return Err(ValidationError::empty_field("cancel_url"));
        }
        Ok(Self {
            success_url,
            cancel_url,
        })
    }
}

/// Everything a provider needs to open a checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub order: Order,
    pub urls: CheckoutUrls,
}

/// Session created by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Hosted checkout page the customer is redirected to.
    pub url: String,
    pub provider_session_id: String,
}
