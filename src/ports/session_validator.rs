//! Staff token validation port.
//!
//! Tokens are minted by a separate auth service; this side only checks them.
//! Implementations report a refresh token as `WrongTokenType`, a bad
//! signature or malformed token as `InvalidToken`, an expired one as
//! `TokenExpired`, and their own outages as `ServiceUnavailable`.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// `token` is the raw value without the `Bearer ` prefix.
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
