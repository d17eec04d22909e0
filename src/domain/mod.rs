//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, auth vocabulary)
//! - `order` - Order lifecycle, line items and the update rules
//! - `payment` - Checkout requests and recorded payments

pub mod foundation;
pub mod order;
pub mod payment;
