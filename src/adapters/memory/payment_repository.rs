//! In-memory payment repository for tests and local development.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId};
use crate::domain::payment::Payment;
use crate::ports::PaymentRepository;

/// In-memory [`PaymentRepository`] enforcing unique provider payment ids.
#[derive(Debug, Default)]
pub struct InMemoryPaymentRepository {
    payments: RwLock<Vec<Payment>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored payments.
    pub async fn count(&self) -> usize {
        self.payments.read().await.len()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn save_payment(&self, payment: &Payment) -> Result<(), DomainError> {
        let mut payments = self.payments.write().await;
        let duplicate = payments.iter().any(|p| {
            p.provider == payment.provider && p.provider_payment_id == payment.provider_payment_id
        });
        if duplicate {
            return Err(DomainError::new(
                ErrorCode::PaymentAlreadyRecorded,
                format!(
                    "payment {} already recorded",
                    payment.provider_payment_id
                ),
            ));
        }
        payments.push(payment.clone());
        Ok(())
    }

    async fn find_by_provider_payment_id(
        &self,
        provider: &str,
        provider_payment_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        Ok(self
            .payments
            .read()
            .await
            .iter()
            .find(|p| p.provider == provider && p.provider_payment_id == provider_payment_id)
            .cloned())
    }

    async fn find_by_order(&self, order_id: &OrderId) -> Result<Vec<Payment>, DomainError> {
        Ok(self
            .payments
            .read()
            .await
            .iter()
            .filter(|p| p.order_id == *order_id)
            .cloned()
            .collect())
    }
}
