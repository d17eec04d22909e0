//! UpdateOrderHandler - Applies status and tip changes under the edit policy.

use std::sync::Arc;

use crate::domain::foundation::{Actor, OrderId};
use crate::domain::order::{EditPolicy, Order, OrderError, OrderUpdate, WaiterCheck};
use crate::ports::{OrderChange, OrderRepository};

/// Command to update an order.
#[derive(Debug, Clone)]
pub struct UpdateOrderCommand {
    pub order_id: OrderId,
    pub update: OrderUpdate,
    pub actor: Actor,
}

/// Handler for order updates.
pub struct UpdateOrderHandler {
    repository: Arc<dyn OrderRepository>,
}

impl UpdateOrderHandler {
    pub fn new(repository: Arc<dyn OrderRepository>) -> Self {
        Self { repository }
    }

    /// Returns the order as re-read after the update.
    pub async fn handle(&self, cmd: UpdateOrderCommand) -> Result<Order, OrderError> {
        // 1. Load current state
        let order = self.repository.get_order(&cmd.order_id).await?;

        // 2. Gates: finalized, status change, locked edit
        if let WaiterCheck::Required(user_id) =
            EditPolicy::evaluate(order.status, &cmd.update, &cmd.actor)?
        {
            let is_waiter = self
                .repository
                .is_user_restaurant_waiter(&user_id, &order.restaurant_id)
                .await?;
            if !is_waiter {
                tracing::info!(
                    order_id = %order.id,
                    user_id = %user_id,
                    "Status change on locked order refused for non-waiter"
                );
                return Err(OrderError::UserCannotEditLockedOrder);
            }
        }

        // 3. Transition must follow the lifecycle
        let status = EditPolicy::resolve_status(order.status, cmd.update.status())?;

        // 4. Compare-and-set on the status we read
        if status.is_some() || cmd.update.tip_amount_in_cents().is_some() {
            self.repository
                .update_order(&OrderChange {
                    order_id: order.id,
                    expected_status: order.status,
                    status,
                    tip_amount_in_cents: cmd.update.tip_amount_in_cents(),
                })
                .await?;
        }

        if let Some(status) = status {
            tracing::info!(order_id = %order.id, from = %order.status, to = %status, "Order status changed");
        }

        // 5. Re-read
        Ok(self.repository.get_order(&cmd.order_id).await?)
    }
}
