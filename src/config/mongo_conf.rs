use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, info};

use crate::config::{parse_var, require_var, ConfigError};

/// Connection settings for the document store holding users, doctors,
/// patients and patient updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub pool_size: u32,
    pub connection_timeout_secs: u64,
}

impl MongoConfig {
    /// - MONGO_URI, MONGO_DATABASE: required
    /// - MONGO_USERNAME / MONGO_PASSWORD: optional credentials, used only as a pair
    /// - MONGO_POOL_SIZE: defaults to 10
    /// - MONGO_CONNECTION_TIMEOUT: seconds, defaults to 5
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading MongoDB configuration from environment variables");
        let defaults = MongoConfig::default();

        let config = MongoConfig {
            uri: require_var("MONGO_URI")?,
            database: require_var("MONGO_DATABASE")?,
            username: env::var("MONGO_USERNAME").ok(),
            password: env::var("MONGO_PASSWORD").ok(),
            pool_size: parse_var("MONGO_POOL_SIZE", defaults.pool_size)?,
            connection_timeout_secs: parse_var("MONGO_CONNECTION_TIMEOUT", defaults.connection_timeout_secs)?,
        };
        debug!(
            database = %config.database,
            has_credentials = config.username.is_some() && config.password.is_some(),
            pool_size = config.pool_size,
            "MongoDB configuration read"
        );

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

        if self.uri.is_empty() {
            return invalid("MongoDB URI cannot be empty");
        }
        if !self.uri.starts_with("mongodb://") && !self.uri.starts_with("mongodb+srv://") {
            return invalid("MongoDB URI must start with mongodb:// or mongodb+srv://");
        }
        if self.database.is_empty() {
            return invalid("MongoDB database cannot be empty");
        }
        if self.pool_size == 0 {
            return invalid("MongoDB pool size must be greater than 0");
        }
        if self.connection_timeout_secs == 0 {
            return invalid("MongoDB connection timeout must be greater than 0");
        }
        if self.username.is_some() != self.password.is_some() {
            return invalid("MONGO_USERNAME and MONGO_PASSWORD must be set together");
        }
        if matches!(self.username.as_deref(), Some("")) {
            return invalid("MongoDB username cannot be empty if set");
        }
        Ok(())
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "doctor_feedback".to_string(),
            username: None,
            password: None,
            pool_size: 10,
            connection_timeout_secs: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MongoConfig::default();
        assert_eq!(config.database, "doctor_feedback");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_uri_scheme_checked() {
        let mut config = MongoConfig::default();
        config.uri = "localhost:27017".to_string();
        assert!(config.validate().is_err());
        config.uri = "mongodb+srv://cluster.example.net".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_pool_size_rejected() {
        let mut config = MongoConfig::default();
        config.pool_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_credentials_come_in_pairs() {
        let mut config = MongoConfig::default();
        config.username = Some("doctor_feedback".to_string());
        assert!(config.validate().is_err());
        config.password = Some("secret".to_string());
        assert!(config.validate().is_ok());
        config.username = Some(String::new());
        assert!(config.validate().is_err());
    }
}
