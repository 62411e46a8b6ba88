use std::env;
use tracing::{debug, error, info};

use crate::config::{parse_var, require_var, ConfigError};

/// Two weeks, the usual lifetime of a browser login session
const DEFAULT_SESSION_EXPIRY_MINUTES: i64 = 20160;

/// JWT configuration structure
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// JWT secret key for signing session tokens
    pub jwt_secret: String,
    /// Session token lifetime in minutes
    pub session_expiration: i64,
    /// JWT issuer (optional)
    pub jwt_issuer: Option<String>,
}

impl JwtConfig {
    /// - JWT_SECRET: signing key, at least 32 characters (required)
    /// - JWT_SESSION_EXPIRY: session lifetime in minutes (defaults to two weeks)
    /// - JWT_ISSUER: optional `iss` claim, checked on validation when set
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading JWT configuration from environment variables");

        let config = JwtConfig {
            jwt_secret: require_var("JWT_SECRET")?,
            session_expiration: parse_var("JWT_SESSION_EXPIRY", DEFAULT_SESSION_EXPIRY_MINUTES)?,
            jwt_issuer: env::var("JWT_ISSUER").ok().filter(|issuer| !issuer.is_empty()),
        };
        debug!(
            secret_len = config.jwt_secret.len(),
            session_minutes = config.session_expiration,
            issuer = ?config.jwt_issuer,
            "JWT configuration read"
        );

        config.validate()?;
        Ok(config)
    }

    /// Validate the JWT configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        debug!("Validating JWT configuration");

        if self.jwt_secret.is_empty() {
            error!("JWT secret cannot be empty");
            return Err(ConfigError::ValidationError("JWT secret cannot be empty".to_string()));
        }

        if self.jwt_secret.len() < 32 {
            error!("JWT secret is too short (minimum 32 characters required)");
            return Err(ConfigError::ValidationError(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }

        if self.session_expiration <= 0 {
            error!("Session expiration must be greater than 0");
            return Err(ConfigError::ValidationError(
                "Session expiration must be greater than 0".to_string(),
            ));
        }

        debug!("JWT configuration validation passed");
        Ok(())
    }

    /// Session lifetime in seconds, used for cookie Max-Age
    pub fn session_expiration_secs(&self) -> i64 {
        self.session_expiration * 60
    }
}

/// Create JWT configuration for testing with default values
impl Default for JwtConfig {
    fn default() -> Self {
        JwtConfig {
            jwt_secret: "test_secret_key_for_jwt_testing_should_be_long_enough_for_security_purposes"
                .to_string(),
            session_expiration: DEFAULT_SESSION_EXPIRY_MINUTES,
            jwt_issuer: Some("doctor-feedback-backend-test".to_string()),
        }
    }
}
