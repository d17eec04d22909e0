//! Database configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const MAX_POOL_SIZE: u32 = 100;

/// PostgreSQL pool settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,

    /// Apply `migrations/` on startup
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("DATABASE__URL"));
        }
        if !self.url.starts_with("postgres://") && !self.url.starts_with("postgresql://") {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.min_connections > self.max_connections {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.max_connections > MAX_POOL_SIZE {
            return Err(ValidationError::PoolSizeTooLarge);
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            run_migrations: default_run_migrations(),
        }
    }
}

fn default_min_connections() -> u32 {
    2
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_max_lifetime() -> u64 {
    1800
}

fn default_run_migrations() -> bool {
    true
}
