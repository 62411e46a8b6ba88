use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info};

use crate::config::{flag_var, require_var, ConfigError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinioConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket_name: String,
    /// Public base URL used to build image links
    pub links_prefix: String,
    pub secure: bool,
}

impl MinioConfig {
    /// - MINIO_ENDPOINT, MINIO_ACCESS_KEY, MINIO_SECRET_KEY, MINIO_BUCKET_NAME: required
    /// - MINIO_LINKS_PREFIX: public base URL for image links (defaults to "http://127.0.0.1:9000")
    /// - MINIO_SECURE: HTTPS to the endpoint (defaults to false)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading MinIO configuration from environment variables");

        let config = Self {
            endpoint: require_var("MINIO_ENDPOINT")?,
            access_key: require_var("MINIO_ACCESS_KEY")?,
            secret_key: require_var("MINIO_SECRET_KEY")?,
            bucket_name: require_var("MINIO_BUCKET_NAME")?,
            links_prefix: env::var("MINIO_LINKS_PREFIX").unwrap_or_else(|_| MinioConfig::default().links_prefix),
            secure: flag_var("MINIO_SECURE"),
        };
        debug!(endpoint = %config.endpoint, bucket = %config.bucket_name, "MinIO configuration read");

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.is_empty() {
            return Err(ConfigError::ValidationError("Endpoint cannot be empty".to_string()));
        }

        if self.access_key.is_empty() || self.secret_key.is_empty() {
            return Err(ConfigError::ValidationError("MinIO credentials cannot be empty".to_string()));
        }

        if !self.bucket_name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.') {
            error!("Invalid bucket name format: {}", self.bucket_name);
            return Err(ConfigError::ValidationError(
                "Bucket name contains invalid characters".to_string(),
            ));
        }

        if !self.links_prefix.starts_with("http://") && !self.links_prefix.starts_with("https://") {
            return Err(ConfigError::ValidationError(
                "MINIO_LINKS_PREFIX must be an http(s) URL".to_string(),
            ));
        }

        if self.bucket_name.len() < 3 || self.bucket_name.len() > 63 {
            return Err(ConfigError::ValidationError(
                "Bucket name must be between 3 and 63 characters".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the full endpoint URL with protocol
    pub fn get_endpoint_url(&self) -> String {
        let protocol = if self.secure { "https" } else { "http" };
        format!("{}://{}", protocol, self.endpoint)
    }
}

impl Default for MinioConfig {
    fn default() -> Self {
        Self {
            endpoint: "localhost:9000".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            bucket_name: "doctor-feedback".to_string(),
            links_prefix: "http://127.0.0.1:9000".to_string(),
            secure: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_config() {
        assert!(MinioConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_bucket_name() {
        let mut config = MinioConfig::default();
        config.bucket_name = "ab".to_string();
        assert!(config.validate().is_err());
        config.bucket_name = "Has_Upper".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_links_prefix() {
        let mut config = MinioConfig::default();
        config.links_prefix = "cdn.example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_get_endpoint_url() {
        let mut config = MinioConfig::default();
        assert_eq!(config.get_endpoint_url(), "http://localhost:9000");
        config.secure = true;
        assert_eq!(config.get_endpoint_url(), "https://localhost:9000");
    }
}
