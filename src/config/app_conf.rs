use std::env;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::config::{flag_var, parse_var, ConfigError};

/// Where doctors, patients and updates are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Mongo,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::InvalidValue(format!("Unknown STORAGE_BACKEND: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    /// Adds the `Secure` attribute to the session cookie
    pub secure_cookies: bool,
    /// Request body limit for the multipart patient forms
    pub max_upload_bytes: usize,
}

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

impl AppConfig {
    /// - APP_HOST / APP_PORT: listen address (127.0.0.1:8080)
    /// - STORAGE_BACKEND: `mongo` or `memory` (defaults to mongo)
    /// - SECURE_COOKIES: mark the session cookie `Secure` (defaults to false)
    /// - MAX_UPLOAD_BYTES: request body limit for the patient forms (10 MiB)
    pub fn from_env() -> Result<Self, ConfigError> {
        let storage = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => {
                warn!("STORAGE_BACKEND not set, using default: mongo");
                StorageBackend::Mongo
            }
        };
        let defaults = AppConfig::default();
        let config = AppConfig {
            host: env::var("APP_HOST").unwrap_or(defaults.host),
            port: parse_var("APP_PORT", defaults.port)?,
            storage,
            secure_cookies: flag_var("SECURE_COOKIES"),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
        };
        debug!(
            host = %config.host,
            port = config.port,
            storage = ?config.storage,
            secure_cookies = config.secure_cookies,
            max_upload_bytes = config.max_upload_bytes,
            "Application configuration loaded"
        );
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            storage: StorageBackend::Memory,
            secure_cookies: false,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}
