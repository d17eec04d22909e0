//! Configuration errors.
//!
//! Messages name the environment variable to fix, with the
//! `DINING_ORDERS__` prefix left off.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("configuration rejected: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Problems `AppConfig::validate` finds after a successful load.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is not set")]
    MissingRequired(&'static str),

    #[error("SERVER__PORT must not be 0")]
    InvalidPort,

    #[error("SERVER__REQUEST_TIMEOUT_SECS must be between 1 and 300")]
    InvalidTimeout,

    #[error("DATABASE__URL must be a postgres:// or postgresql:// URL")]
    InvalidDatabaseUrl,

    #[error("DATABASE__MIN_CONNECTIONS exceeds DATABASE__MAX_CONNECTIONS")]
    InvalidPoolSize,

    #[error("DATABASE__MAX_CONNECTIONS must be at most 100")]
    PoolSizeTooLarge,

    #[error("PAYMENT__STRIPE_API_KEY must start with sk_test_ or sk_live_")]
    InvalidStripeKey,

    #[error("PAYMENT__STRIPE_WEBHOOK_SECRET must start with whsec_")]
    InvalidStripeWebhookSecret,

    #[error("PAYMENT__API_BASE_URL must use https in production")]
    PaymentUrlMustBeHttps,

    #[error("AUTH__JWT_SECRET must be at least {0} bytes")]
    JwtSecretTooShort(usize),

    #[error("WEBSOCKET__{0} is out of range")]
    InvalidWebSocketSetting(&'static str),
}
