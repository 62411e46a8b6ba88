use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::config::ConfigError;

/// Where uploaded patient images are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaBackend {
    Local,
    Minio,
}

impl FromStr for MediaBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "fs" => Ok(MediaBackend::Local),
            "minio" | "s3" => Ok(MediaBackend::Minio),
            other => Err(ConfigError::InvalidValue(format!("Unknown MEDIA_BACKEND: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub backend: MediaBackend,
    /// Root directory for the local backend
    pub root: PathBuf,
    /// URL prefix under which the local media root is served
    pub url_prefix: String,
}

impl MediaConfig {
    /// Load media configuration from environment variables
    ///
    /// - MEDIA_BACKEND: `local` or `minio` (defaults to local)
    /// - MEDIA_ROOT: directory for the local backend (defaults to "media")
    /// - MEDIA_URL: public prefix for local files (defaults to "/media")
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = match env::var("MEDIA_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => {
                warn!("MEDIA_BACKEND not set, using default: local");
                MediaBackend::Local
            }
        };
        let root = PathBuf::from(env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string()));
        let url_prefix = env::var("MEDIA_URL").unwrap_or_else(|_| "/media".to_string());
        debug!(?backend, root = %root.display(), url_prefix = %url_prefix, "Media configuration loaded");

        let config = MediaConfig { backend, root, url_prefix };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == MediaBackend::Local && self.root.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError("MEDIA_ROOT cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Local-backend configuration rooted at `root`
    pub fn local(root: impl Into<PathBuf>) -> Self {
        MediaConfig {
            backend: MediaBackend::Local,
            root: root.into(),
            url_prefix: "/media".to_string(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        MediaConfig::local("media")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_backend_parse() {
        assert_eq!("local".parse::<MediaBackend>().unwrap(), MediaBackend::Local);
        assert_eq!("MINIO".parse::<MediaBackend>().unwrap(), MediaBackend::Minio);
        assert!("ftp".parse::<MediaBackend>().is_err());
    }

    #[test]
    fn test_empty_root_rejected() {
        let config = MediaConfig::local("");
        assert!(config.validate().is_err());
    }
}
