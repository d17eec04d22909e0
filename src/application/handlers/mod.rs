//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod order;
pub mod payment;

pub use order::{
    AddItemCommand, AddItemHandler, AddItemResult, AssignWaiterCommand, AssignWaiterHandler,
    DeleteItemCommand, DeleteItemHandler, GetOrCreateCurrentOrderCommand,
    GetOrCreateCurrentOrderHandler, GetOrCreateCurrentOrderResult, GetOrderHandler, GetOrderQuery,
    RemoveWaiterCommand, RemoveWaiterHandler, UpdateOrderCommand, UpdateOrderHandler,
};
pub use payment::{
    CreateCheckoutCommand, CreateCheckoutHandler, HandlePaymentWebhookCommand,
    HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};
