//! GetOrderHandler - Query handler for the full order view.

use std::sync::Arc;

use crate::domain::foundation::OrderId;
use crate::domain::order::{Order, OrderError};
use crate::ports::OrderRepository;

/// Query for one order.
#[derive(Debug, Clone)]
pub struct GetOrderQuery {
    pub order_id: OrderId,
}

/// Handler for reading an order.
pub struct GetOrderHandler {
    repository: Arc<dyn OrderRepository>,
}

impl GetOrderHandler {
    pub fn new(repository: Arc<dyn OrderRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: GetOrderQuery) -> Result<Order, OrderError> {
        Ok(self.repository.get_order(&query.order_id).await?)
    }
}
