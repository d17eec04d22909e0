//! Payment command handlers.

mod create_checkout;
mod handle_payment_webhook;

pub use create_checkout::{CreateCheckoutCommand, CreateCheckoutHandler};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};
