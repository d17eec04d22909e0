//! Fixed-token session validator for tests.
//!
//! ```ignore
//! let (validator, waiter_id) = MockSessionValidator::new().with_waiter("waiter-token");
//! ```

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, Role, UserId};
use crate::ports::SessionValidator;

/// Unknown tokens are `InvalidToken`. Built once, read-only afterwards.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: HashMap<String, AuthenticatedUser>,
    outage: Option<String>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.tokens.insert(token.into(), user);
        self
    }

    /// Registers a fresh waiter under `token` and returns their id.
    pub fn with_waiter(self, token: impl Into<String>) -> (Self, UserId) {
        let token = token.into();
        let user_id = UserId::new();
        let user = AuthenticatedUser::new(user_id, format!("{}@bistro.test", token), Role::Waiter);
        (self.with_user(token, user), user_id)
    }

    /// Every validation fails as if the auth service were down.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            tokens: HashMap::new(),
            outage: Some(reason.into()),
        }
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if let Some(reason) = &self.outage {
            return Err(AuthError::service_unavailable(reason.clone()));
        }

        self.tokens
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
