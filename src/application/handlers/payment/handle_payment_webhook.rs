//! HandlePaymentWebhookHandler - Records a verified payment and completes its order.
//!
//! Providers redeliver webhooks, so every step tolerates repetition: a known
//! provider payment id returns the stored record, and an order that is
//! already finalized is left untouched.

use std::sync::Arc;

use crate::domain::foundation::{ErrorCode, OrderId};
use crate::domain::order::{Order, OrderError, OrderStatus};
use crate::domain::payment::Payment;
use crate::ports::{OrderChange, OrderRepository, PaymentProvider, PaymentRepository};

/// Attempts at completing the order when another writer moves it in between.
const COMPLETE_ATTEMPTS: usize = 2;

/// Command carrying the raw webhook request.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    pub payload: Vec<u8>,
    pub signature: String,
}

/// Result of webhook processing.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookResult {
    pub payment: Payment,
    /// The order as re-read after completion.
    pub order: Order,
    /// True when the payment had already been recorded.
    pub duplicate: bool,
    /// True when this call moved the order to `completed`.
    pub order_completed: bool,
}

/// Handler for payment success webhooks.
pub struct HandlePaymentWebhookHandler {
    orders: Arc<dyn OrderRepository>,
    payments: Arc<dyn PaymentRepository>,
    provider: Arc<dyn PaymentProvider>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        payments: Arc<dyn PaymentRepository>,
        provider: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            orders,
            payments,
            provider,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, OrderError> {
        // 1. Reject obviously bad requests before the provider sees them
        if cmd.payload.is_empty() {
            return Err(OrderError::invalid_webhook("payload is empty"));
        }
        if cmd.signature.trim().is_empty() {
            return Err(OrderError::invalid_webhook("missing signature header"));
        }

        // 2. Verify and extract
        let verified = self
            .provider
            .verify_webhook(&cmd.payload, &cmd.signature)
            .await
            .map_err(|e| {
                if e.is_webhook_rejection() {
                    tracing::warn!(error = %e, "Webhook rejected");
                    OrderError::invalid_webhook(e.detail())
                } else {
                    tracing::error!(error = %e, "Webhook verification failed");
                    OrderError::payment_provider(e.detail())
                }
            })?;

        // 3. Record once
        let (payment, duplicate) = self.record_payment(verified.into_payment()).await?;

        // 4. Settle the order
        let (order, order_completed) = self.complete_order(&payment.order_id).await?;

        tracing::info!(
            order_id = %payment.order_id,
            payment_id = %payment.id,
            provider_payment_id = %payment.provider_payment_id,
            duplicate,
            order_completed,
            "Payment webhook processed"
        );

        Ok(HandlePaymentWebhookResult {
            payment,
            order,
            duplicate,
            order_completed,
        })
    }

    async fn record_payment(&self, payment: Payment) -> Result<(Payment, bool), OrderError> {
        if let Some(existing) = self.find_existing(&payment).await? {
            return Ok((existing, true));
        }

        match self.payments.save_payment(&payment).await {
            Ok(()) => Ok((payment, false)),
            Err(err) if err.code == ErrorCode::PaymentAlreadyRecorded => {
                // Lost a race with a concurrent delivery
                let existing = self
                    .find_existing(&payment)
                    .await?
                    .ok_or_else(|| OrderError::repository(err.message))?;
                Ok((existing, true))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_existing(&self, payment: &Payment) -> Result<Option<Payment>, OrderError> {
        Ok(self
            .payments
            .find_by_provider_payment_id(&payment.provider, &payment.provider_payment_id)
            .await?)
    }

    async fn complete_order(&self, order_id: &OrderId) -> Result<(Order, bool), OrderError> {
        for _ in 0..COMPLETE_ATTEMPTS {
            let order = self.orders.get_order(order_id).await?;
            if !order.status.can_settle_by_payment() {
                if order.status != OrderStatus::Completed {
                    tracing::warn!(
                        order_id = %order_id,
                        status = %order.status,
                        "Payment received for order that cannot be completed"
                    );
                }
                return Ok((order, false));
            }

            let change = OrderChange {
                order_id: *order_id,
                expected_status: order.status,
                status: Some(OrderStatus::Completed),
                tip_amount_in_cents: None,
            };
            match self.orders.update_order(&change).await {
                Ok(()) => return Ok((self.orders.get_order(order_id).await?, true)),
                Err(err) if err.code == ErrorCode::ConcurrentModification => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Err(OrderError::ConcurrentModification)
    }
}
