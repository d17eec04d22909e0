//! Stripe Checkout and webhook verification for table orders.
//!
//! Keys come from `config::PaymentConfig`
//! (`DINING_ORDERS__PAYMENT__STRIPE_API_KEY`,
//! `DINING_ORDERS__PAYMENT__STRIPE_WEBHOOK_SECRET`).

mod mock_payment_provider;
mod stripe_adapter;
mod webhook_types;

pub use mock_payment_provider::MockPaymentProvider;
pub use stripe_adapter::{sign_webhook_payload, StripeConfig, StripePaymentAdapter, STRIPE_PROVIDER};
