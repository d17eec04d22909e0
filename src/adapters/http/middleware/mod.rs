//! HTTP middleware for axum.

pub mod auth;

pub use auth::{
    auth_middleware, extract_token, AuthState, Caller, StaffUser, Unauthenticated,
};
