//! HS256 JWT adapter for auth-service access tokens.
//!
//! The auth service signs tokens with a shared secret. This adapter
//! implements the `SessionValidator` port by:
//!
//! 1. Verifying the HS256 signature and `exp` (with leeway)
//! 2. Rejecting tokens whose `token_type` is not the configured access type
//! 3. Mapping claims to the domain `AuthenticatedUser`
//!
//! # Example
//!
//! ```ignore
//! let config = JwtConfig::new(secret).with_leeway(Duration::from_secs(30));
//! let validator = JwtSessionValidator::new(config);
//! let user = validator.validate("eyJ...").await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, AuthenticatedUser, Role, UserId};
use crate::ports::SessionValidator;

/// Token type accepted on API routes.
pub const ACCESS_TOKEN_TYPE: &str = "access";

/// Configuration for the JWT adapter.
#[derive(Clone)]
pub struct JwtConfig {
    /// Shared HS256 signing secret.
    secret: SecretString,

    /// Value the `token_type` claim must carry.
    required_token_type: String,

    /// Clock skew tolerance applied to `exp`.
    leeway: Duration,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
            required_token_type: ACCESS_TOKEN_TYPE.to_string(),
            leeway: Duration::from_secs(0),
        }
    }

    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    pub fn with_required_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.required_token_type = token_type.into();
        self
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("required_token_type", &self.required_token_type)
            .field("leeway", &self.leeway)
            .finish()
    }
}

/// Claims issued by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub user_id: UserId,
    pub email: String,
    pub token_type: String,
    pub role: Role,
    /// Expiry (Unix epoch seconds).
    pub exp: i64,
}

/// `SessionValidator` backed by HS256 tokens.
pub struct JwtSessionValidator {
    config: JwtConfig,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionValidator {
    pub fn new(config: JwtConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.secret.expose_secret().as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway.as_secs();
        validation.set_required_spec_claims(&["exp"]);

        Self {
            config,
            decoding_key,
            validation,
        }
    }

    fn decode_claims(&self, token: &str) -> Result<AccessClaims, AuthError> {
        decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        tracing::debug!("Token expired");
                        AuthError::TokenExpired
                    }
                    ErrorKind::InvalidSignature => {
                        tracing::warn!("Token signature mismatch");
                        AuthError::InvalidToken
                    }
                    _ => {
                        tracing::debug!(error = %e, "Token validation failed");
                        AuthError::InvalidToken
                    }
                }
            })
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.decode_claims(token)?;

        if claims.token_type != self.config.required_token_type {
            tracing::debug!(token_type = %claims.token_type, "Rejected non-access token");
            return Err(AuthError::WrongTokenType);
        }

        Ok(AuthenticatedUser::new(
            claims.user_id,
            claims.email,
            claims.role,
        ))
    }
}

impl std::fmt::Debug for JwtSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionValidator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
