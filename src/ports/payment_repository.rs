//! Payment repository port.
//!
//! Payments are append-only. `provider_payment_id` is unique, which makes
//! webhook redelivery safe.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrderId};
use crate::domain::payment::Payment;

/// Repository port for recorded payments.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Saves a payment.
    ///
    /// # Errors
    ///
    /// - `PaymentAlreadyRecorded` if the provider payment id is already stored
    /// - `DatabaseError` on persistence failure
    async fn save_payment(&self, payment: &Payment) -> Result<(), DomainError>;

    /// Finds a payment by the provider's id.
    async fn find_by_provider_payment_id(
        &self,
        provider: &str,
        provider_payment_id: &str,
    ) -> Result<Option<Payment>, DomainError>;

    /// Lists payments recorded for an order, oldest first.
    async fn find_by_order(&self, order_id: &OrderId) -> Result<Vec<Payment>, DomainError>;
}
