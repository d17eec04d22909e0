//! Order command and query handlers.

mod add_item;
mod assign_waiter;
mod delete_item;
mod get_or_create_current_order;
mod get_order;
mod remove_waiter;
mod update_order;

pub use add_item::{AddItemCommand, AddItemHandler, AddItemResult};
pub use assign_waiter::{AssignWaiterCommand, AssignWaiterHandler};
pub use delete_item::{DeleteItemCommand, DeleteItemHandler};
pub use get_or_create_current_order::{
    GetOrCreateCurrentOrderCommand, GetOrCreateCurrentOrderHandler, GetOrCreateCurrentOrderResult,
};
pub use get_order::{GetOrderHandler, GetOrderQuery};
pub use remove_waiter::{RemoveWaiterCommand, RemoveWaiterHandler};
pub use update_order::{UpdateOrderCommand, UpdateOrderHandler};
