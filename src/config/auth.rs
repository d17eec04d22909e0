//! Authentication configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;
use crate::adapters::auth::{JwtConfig, ACCESS_TOKEN_TYPE};

/// Minimum HS256 secret length accepted in production.
const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Settings for validating access tokens issued by the auth service.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared HS256 secret
    pub jwt_secret: String,

    #[serde(default = "default_token_type")]
    pub required_token_type: String,

    /// Clock skew tolerance for `exp`
    #[serde(default)]
    pub leeway_secs: u64,
}

impl AuthConfig {
    pub fn leeway(&self) -> Duration {
        Duration::from_secs(self.leeway_secs)
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig::new(&self.jwt_secret)
            .with_required_token_type(&self.required_token_type)
            .with_leeway(self.leeway())
    }

    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        if self.jwt_secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        if environment == Environment::Production
            && self.jwt_secret.len() < MIN_PRODUCTION_SECRET_LEN
        {
            return Err(ValidationError::JwtSecretTooShort(MIN_PRODUCTION_SECRET_LEN));
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            required_token_type: default_token_type(),
            leeway_secs: 0,
        }
    }
}

fn default_token_type() -> String {
    ACCESS_TOKEN_TYPE.to_string()
}
