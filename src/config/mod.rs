//! Application configuration
//!
//! Loaded from environment variables with the `config` and `dotenvy` crates.
//! Variables use the `DINING_ORDERS` prefix and `__` between nested keys.
//!
//! ```no_run
//! use dining_orders::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod database;
mod error;
mod payment;
mod server;
mod websocket;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};
pub use websocket::WebSocketConfig;

use serde::Deserialize;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "DINING_ORDERS";

/// Root configuration for the orders service.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub payment: PaymentConfig,

    pub auth: AuthConfig,

    #[serde(default)]
    pub websocket: WebSocketConfig,
}

impl AppConfig {
    /// Load configuration from `.env` and the process environment.
    ///
    /// - `DINING_ORDERS__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `DINING_ORDERS__DATABASE__URL=...` -> `database.url = ...`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic checks that serde cannot express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let environment = self.server.environment;
        self.server.validate()?;
        self.database.validate()?;
        self.payment.validate(environment)?;
        self.auth.validate(environment)?;
        self.websocket.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
