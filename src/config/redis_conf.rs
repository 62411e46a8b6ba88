use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, info, warn};

use crate::config::{flag_var, parse_var, require_var, ConfigError};

/// Redis holds the ids of revoked session tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: u8,
    pub use_tls: bool,
    /// Namespace for every key this service writes
    pub key_prefix: String,
}

impl RedisConfig {
    /// - REDIS_HOST: required; without it sessions are revoked in process memory
    /// - REDIS_PORT: defaults to 6379
    /// - REDIS_USERNAME / REDIS_PASSWORD: optional (username needs Redis 6+)
    /// - REDIS_DATABASE: defaults to 0
    /// - REDIS_USE_TLS: defaults to false
    /// - REDIS_KEY_PREFIX: defaults to "doctor-feedback"
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading Redis configuration from environment variables");
        let defaults = RedisConfig::default();

        let config = RedisConfig {
            host: require_var("REDIS_HOST")?,
            port: parse_var("REDIS_PORT", defaults.port)?,
            username: env::var("REDIS_USERNAME").ok(),
            password: env::var("REDIS_PASSWORD").ok(),
            database: parse_var("REDIS_DATABASE", defaults.database)?,
            use_tls: flag_var("REDIS_USE_TLS"),
            key_prefix: env::var("REDIS_KEY_PREFIX").unwrap_or(defaults.key_prefix),
        };
        debug!(host = %config.host, port = config.port, database = config.database, "Redis configuration read");

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::ValidationError("Host cannot be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ConfigError::ValidationError("Port must be greater than 0".to_string()));
        }
        if self.key_prefix.is_empty() || self.key_prefix.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(
                "Key prefix must be non-empty and contain no whitespace".to_string(),
            ));
        }
        if self.database > 15 {
            warn!("Redis database number is high: {} (Redis default max is 15)", self.database);
        }
        Ok(())
    }

    pub fn get_connection_url(&self) -> String {
        let scheme = if self.use_tls { "rediss" } else { "redis" };
        let auth = match (&self.username, &self.password) {
            (Some(user), Some(password)) => format!("{}:{}@", user, password),
            (None, Some(password)) => format!(":{}@", password),
            _ => String::new(),
        };
        format!("{}://{}{}:{}/{}", scheme, auth, self.host, self.port, self.database)
    }

    /// `prefix:part:part...`
    pub fn key(&self, parts: &[&str]) -> String {
        std::iter::once(self.key_prefix.as_str())
            .chain(parts.iter().copied())
            .collect::<Vec<_>>()
            .join(":")
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        RedisConfig {
            host: "localhost".to_string(),
            port: 6379,
            username: None,
            password: None,
            database: 0,
            use_tls: false,
            key_prefix: "doctor-feedback".to_string(),
        }
    }
}
