//! Shared state for the HTTP and WebSocket routes.

use std::sync::Arc;

use crate::adapters::websocket::{BroadcastHub, WebSocketSettings};
use crate::application::handlers::order::{
    AddItemHandler, AssignWaiterHandler, DeleteItemHandler, GetOrCreateCurrentOrderHandler,
    GetOrderHandler, RemoveWaiterHandler, UpdateOrderHandler,
};
use crate::application::handlers::payment::{CreateCheckoutHandler, HandlePaymentWebhookHandler};
use crate::ports::{OrderRepository, PaymentProvider, PaymentRepository};

/// Dependencies every request handler draws from.
///
/// Cloned per request; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub order_repository: Arc<dyn OrderRepository>,
    pub payment_repository: Arc<dyn PaymentRepository>,
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub hub: Arc<BroadcastHub>,
    pub websocket: WebSocketSettings,
}

impl AppState {
    pub fn new(
        order_repository: Arc<dyn OrderRepository>,
        payment_repository: Arc<dyn PaymentRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            order_repository,
            payment_repository,
            payment_provider,
            hub: Arc::new(BroadcastHub::new()),
            websocket: WebSocketSettings::default(),
        }
    }

    pub fn with_hub(mut self, hub: Arc<BroadcastHub>) -> Self {
        self.hub = hub;
        self
    }

    pub fn with_websocket_settings(mut self, settings: WebSocketSettings) -> Self {
        self.websocket = settings;
        self
    }

    pub fn current_order_handler(&self) -> GetOrCreateCurrentOrderHandler {
        GetOrCreateCurrentOrderHandler::new(self.order_repository.clone())
    }

    pub fn get_order_handler(&self) -> GetOrderHandler {
        GetOrderHandler::new(self.order_repository.clone())
    }

    pub fn add_item_handler(&self) -> AddItemHandler {
        AddItemHandler::new(self.order_repository.clone())
    }

    pub fn delete_item_handler(&self) -> DeleteItemHandler {
        DeleteItemHandler::new(self.order_repository.clone())
    }

    pub fn update_order_handler(&self) -> UpdateOrderHandler {
        UpdateOrderHandler::new(self.order_repository.clone())
    }

    pub fn assign_waiter_handler(&self) -> AssignWaiterHandler {
        AssignWaiterHandler::new(self.order_repository.clone())
    }

    pub fn remove_waiter_handler(&self) -> RemoveWaiterHandler {
        RemoveWaiterHandler::new(self.order_repository.clone())
    }

    pub fn checkout_handler(&self) -> CreateCheckoutHandler {
        CreateCheckoutHandler::new(self.order_repository.clone(), self.payment_provider.clone())
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            self.order_repository.clone(),
            self.payment_repository.clone(),
            self.payment_provider.clone(),
        )
    }
}
