//! Authentication types for the domain layer.
//!
//! Tokens are issued by the separate auth service. This crate only consumes
//! the validated claims, so these types carry no provider dependencies. The
//! `SessionValidator` port turns a bearer token into an [`AuthenticatedUser`].
//!
//! Customers at a table never log in. Their requests arrive as
//! [`Actor::Anonymous`] and the order rules treat them accordingly.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::UserId;

/// Staff role carried in the auth-service token.
///
/// Encoded on the wire as the integers the auth service uses
/// (`1` manager, `2` waiter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Role {
    Manager,
    Waiter,
}

impl TryFrom<u8> for Role {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Role::Manager),
            2 => Ok(Role::Waiter),
            other => Err(format!("unknown role {}", other)),
        }
    }
}

impl From<Role> for u8 {
    fn from(role: Role) -> Self {
        match role {
            Role::Manager => 1,
            Role::Waiter => 2,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Manager => write!(f, "manager"),
            Role::Waiter => write!(f, "waiter"),
        }
    }
}

/// Staff member extracted from a validated access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The user identifier issued by the auth service.
    pub id: UserId,

    /// Email address from the token claims.
    pub email: String,

    /// Staff role.
    pub role: Role,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user.
    pub fn new(id: UserId, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            email: email.into(),
            role,
        }
    }
}

/// Who is performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Actor {
    /// Unauthenticated caller, typically a customer's phone at the table.
    #[default]
    Anonymous,
    /// Authenticated staff member.
    Staff(AuthenticatedUser),
}

impl Actor {
    /// Returns the staff user id, or `None` for anonymous callers.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Actor::Anonymous => None,
            Actor::Staff(user) => Some(user.id),
        }
    }

    /// Returns true when the caller presented a valid token.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::Staff(_))
    }
}

impl From<Option<AuthenticatedUser>> for Actor {
    fn from(user: Option<AuthenticatedUser>) -> Self {
        user.map(Actor::Staff).unwrap_or(Actor::Anonymous)
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token has expired.
    #[error("Token expired")]
    TokenExpired,

    /// A refresh token was presented where an access token is required.
    #[error("Wrong token type")]
    WrongTokenType,

    /// The authentication backend is unavailable.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this error indicates the user should re-authenticate.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::WrongTokenType
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff() -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new(), "waiter@bistro.test", Role::Waiter)
    }

    #[test]
    fn role_decodes_from_auth_service_integers() {
        let role: Role = serde_json::from_str("1").unwrap();
        assert_eq!(role, Role::Manager);
        let role: Role = serde_json::from_str("2").unwrap();
        assert_eq!(role, Role::Waiter);
    }

    #[test]
    fn role_rejects_unknown_integer() {
        assert!(serde_json::from_str::<Role>("7").is_err());
    }

    #[test]
    fn role_encodes_as_integer() {
        assert_eq!(serde_json::to_string(&Role::Waiter).unwrap(), "2");
    }

    #[test]
    fn anonymous_actor_has_no_user_id() {
        assert_eq!(Actor::Anonymous.user_id(), None);
        assert!(!Actor::Anonymous.is_authenticated());
    }

    #[test]
    fn staff_actor_exposes_user_id() {
        let user = staff();
        let actor = Actor::Staff(user.clone());
        assert_eq!(actor.user_id(), Some(user.id));
        assert!(actor.is_authenticated());
    }

    #[test]
    fn actor_from_optional_user() {
        assert_eq!(Actor::from(None), Actor::Anonymous);
        assert!(Actor::from(Some(staff())).is_authenticated());
    }

    #[test]
    fn auth_error_reauthentication_classification() {
        assert!(AuthError::TokenExpired.requires_reauthentication());
        assert!(!AuthError::service_unavailable("down").requires_reauthentication());
    }
}
