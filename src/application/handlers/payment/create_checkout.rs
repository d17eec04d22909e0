//! CreateCheckoutHandler - Opens a provider checkout for an order's total and tip.

use std::sync::Arc;

use crate::domain::foundation::OrderId;
use crate::domain::order::OrderError;
use crate::domain::payment::{CheckoutRequest, CheckoutSession, CheckoutUrls};
use crate::ports::{OrderRepository, PaymentProvider};

/// Command to create a checkout session.
#[derive(Debug, Clone)]
pub struct CreateCheckoutCommand {
    pub order_id: OrderId,
    pub urls: CheckoutUrls,
}

/// Handler for checkout creation.
pub struct CreateCheckoutHandler {
    orders: Arc<dyn OrderRepository>,
    provider: Arc<dyn PaymentProvider>,
}

impl CreateCheckoutHandler {
    pub fn new(orders: Arc<dyn OrderRepository>, provider: Arc<dyn PaymentProvider>) -> Self {
        Self { orders, provider }
    }

    pub async fn handle(&self, cmd: CreateCheckoutCommand) -> Result<CheckoutSession, OrderError> {
        // 1. Load order snapshot
        let order = self.orders.get_order(&cmd.order_id).await?;

        // 2. Eligibility
        if order.is_finalized() {
            return Err(OrderError::OrderFinalized);
        }
        if order.is_price_zero() {
            return Err(OrderError::OrderPriceIsZero);
        }

        // 3. Delegate to provider
        let amount = order.amount_due_in_cents();
        let request = CheckoutRequest {
            order,
            urls: cmd.urls,
        };
        let session = self
            .provider
            .create_checkout_session(&request)
            .await
            .map_err(|e| {
                tracing::error!(order_id = %cmd.order_id, error = %e, "Checkout session creation failed");
                OrderError::payment_provider(e.detail())
            })?;

        tracing::info!(
            order_id = %cmd.order_id,
            session_id = %session.provider_session_id,
            amount_in_cents = amount,
            "Checkout session created"
        );

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryOrderRepository;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::domain::order::{OrderItem, OrderStatus};
    use crate::ports::{OrderChange, PaymentError};

    struct Fixture {
        repo: Arc<InMemoryOrderRepository>,
        provider: MockPaymentProvider,
        order_id: OrderId,
    }

    async fn fixture(item_price: Option<i64>, tip: i64) -> Fixture {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let restaurant = repo.add_restaurant("Bistro").await;
        let table = repo.add_table(restaurant, "eur").await;
        let order_id = repo.create_order_for_table(&table, "eur").await.unwrap().id;
        if let Some(price) = item_price {
            let menu = repo.add_menu_item(restaurant, "Steak", price).await;
            repo.add_item_to_order(&order_id, &OrderItem::from_menu_item(&menu))
                .await
                .unwrap();
        }
        if tip > 0 {
            repo.update_order(&OrderChange {
                order_id,
                expected_status: OrderStatus::Open,
                status: None,
                tip_amount_in_cents: Some(tip),
            })
            .await
            .unwrap();
        }
        Fixture {
            repo,
            provider: MockPaymentProvider::new(),
            order_id,
        }
    }

    fn cmd(order_id: OrderId) -> CreateCheckoutCommand {
        CreateCheckoutCommand {
            order_id,
            urls: CheckoutUrls::new("https://app.test/ok", "https://app.test/cancel").unwrap(),
        }
    }

    fn handler(f: &Fixture) -> CreateCheckoutHandler {
        CreateCheckoutHandler::new(f.repo.clone(), Arc::new(f.provider.clone()))
    }

    #[tokio::test]
    async fn creates_session_with_order_snapshot() {
        let f = fixture(Some(2400), 300).await;

        let session = handler(&f).handle(cmd(f.order_id)).await.unwrap();

        assert!(!session.url.is_empty());
        let requests = f.provider.checkout_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].order.id, f.order_id);
        assert_eq!(requests[0].order.amount_due_in_cents(), 2700);
    }

    #[tokio::test]
    async fn tip_alone_is_payable() {
        let f = fixture(None, 500).await;
        assert!(handler(&f).handle(cmd(f.order_id)).await.is_ok());
    }

    #[tokio::test]
    async fn zero_price_order_is_rejected() {
        let f = fixture(None, 0).await;

        let result = handler(&f).handle(cmd(f.order_id)).await;

        assert_eq!(result.unwrap_err(), OrderError::OrderPriceIsZero);
        assert_eq!(f.provider.checkout_requests().len(), 0);
    }

    #[tokio::test]
    async fn finalized_order_is_rejected() {
        let f = fixture(Some(1000), 0).await;
        f.repo.force_status(&f.order_id, OrderStatus::Completed).await;

        let result = handler(&f).handle(cmd(f.order_id)).await;

        assert_eq!(result.unwrap_err(), OrderError::OrderFinalized);
    }

    #[tokio::test]
    async fn provider_failure_is_surfaced() {
        let f = fixture(Some(1000), 0).await;
        f.provider.fail_checkouts(PaymentError::network("timeout"));

        let result = handler(&f).handle(cmd(f.order_id)).await;

        assert!(matches!(result, Err(OrderError::PaymentProvider(_))));
    }
}
