//! Server configuration

use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use super::error::ValidationError;

/// Listener, logging and HTTP transport settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub environment: Environment,

    /// `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Comma-separated browser origins; unset allows any
    pub cors_origins: Option<String>,
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl ServerConfig {
    /// Address to bind the listener to.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cors_origins_list(&self) -> Vec<String> {
        self.cors_origins
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
            log_level: default_log_level(),
            request_timeout_secs: default_request_timeout(),
            cors_origins: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info,dining_orders=debug,sqlx=warn".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_all_interfaces() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.log_level, "info,dining_orders=debug,sqlx=warn");
    }

    #[test]
    fn socket_addr_combines_host_and_port() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            ..Default::default()
        };
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn socket_addr_rejects_hostname() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn cors_origins_are_trimmed_and_blank_entries_dropped() {
        let config = ServerConfig {
            cors_origins: Some("http://localhost:5173, ,http://localhost:3000".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.cors_origins_list(),
            vec!["http://localhost:5173", "http://localhost:3000"]
        );
    }

    #[test]
    fn zero_port_is_rejected() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPort));
    }

    #[test]
    fn timeout_outside_range_is_rejected() {
        for secs in [0, 301] {
            let config = ServerConfig {
                request_timeout_secs: secs,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));
        }
    }
}
