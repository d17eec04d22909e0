//! Payment module - checkout sessions and recorded payments.

mod record;

pub use record::{CheckoutRequest, CheckoutSession, CheckoutUrls, Payment, VerifiedPayment};
