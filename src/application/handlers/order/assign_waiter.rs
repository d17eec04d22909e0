//! AssignWaiterHandler - Attaches a restaurant waiter to an order.

use std::sync::Arc;

use crate::domain::foundation::{OrderId, UserId};
use crate::domain::order::{OrderError, WaiterAssignment};
use crate::ports::OrderRepository;

/// Command to assign a waiter.
#[derive(Debug, Clone)]
pub struct AssignWaiterCommand {
    pub order_id: OrderId,
    pub user_id: UserId,
}

/// Handler for waiter assignment.
pub struct AssignWaiterHandler {
    repository: Arc<dyn OrderRepository>,
}

impl AssignWaiterHandler {
    pub fn new(repository: Arc<dyn OrderRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, cmd: AssignWaiterCommand) -> Result<WaiterAssignment, OrderError> {
        let order = self.repository.get_order(&cmd.order_id).await?;

        let is_waiter = self
            .repository
            .is_user_restaurant_waiter(&cmd.user_id, &order.restaurant_id)
            .await?;
        if !is_waiter {
            return Err(OrderError::NotRestaurantWaiter(cmd.user_id));
        }

        let assignment = self
            .repository
            .assign_waiter(&cmd.order_id, &cmd.user_id)
            .await?;

        tracing::info!(order_id = %cmd.order_id, user_id = %cmd.user_id, "Waiter assigned");
        Ok(assignment)
    }
}
