pub mod app_conf;
pub mod jwt_conf;
pub mod media_conf;
pub mod minio_conf;
pub mod mongo_conf;
pub mod redis_conf;

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use tracing::{debug, error};

pub use app_conf::{AppConfig, StorageBackend};
pub use jwt_conf::JwtConfig;
pub use media_conf::{MediaBackend, MediaConfig};
pub use minio_conf::MinioConfig;
pub use mongo_conf::MongoConfig;
pub use redis_conf::RedisConfig;

/// Common configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Value of a variable that has no default.
pub(crate) fn require_var(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| {
        error!("{} environment variable not found", name);
        ConfigError::EnvVarNotFound(name.to_string())
    })
}

/// Parsed value of `name`, or `default` when it is unset.
/// A set but unparsable value is an error rather than a silent default.
pub(crate) fn parse_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|e| {
            error!("Invalid {} value '{}': {}", name, raw, e);
            ConfigError::ParseError(format!("{}: {}", name, e))
        }),
        Err(_) => {
            debug!("{} not set, using default: {}", name, default);
            Ok(default)
        }
    }
}

/// Unset, empty or unparsable flags are off.
pub(crate) fn flag_var(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().to_ascii_lowercase().parse().ok())
        .unwrap_or(false)
}
