//! Storage for uploaded patient images.
//!
//! Objects are addressed by keys such as `patients/before/<uuid>.jpg`; the
//! stored patient record keeps the key, and `url` turns it into a link.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Invalid media key: {0}")]
    InvalidKey(String),
    #[error("Media I/O error: {0}")]
    Io(String),
    #[error("Media storage error: {0}")]
    Storage(String),
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn put(&self, key: &str, data: Bytes, content_type: Option<&str>) -> Result<(), MediaError>;
    /// Removing a key that does not exist is not an error
    async fn remove(&self, key: &str) -> Result<(), MediaError>;
    fn url(&self, key: &str) -> String;
}

/// Which of the two patient images a file is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Before,
    After,
}

impl ImageSlot {
    pub fn prefix(&self) -> &'static str {
        match self {
            ImageSlot::Before => "patients/before",
            ImageSlot::After => "patients/after",
        }
    }

    pub fn field_name(&self) -> &'static str {
        match self {
            ImageSlot::Before => "before_image",
            ImageSlot::After => "after_image",
        }
    }
}

/// Fresh key for an upload, keeping a short alphanumeric extension from the
/// client's file name.
pub fn image_key(slot: ImageSlot, file_name: Option<&str>) -> String {
    let extension = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("{}/{}{}", slot.prefix(), Uuid::new_v4(), extension)
}

/// Files under a directory on the local filesystem.
pub struct LocalMediaStore {
    root: PathBuf,
    url_prefix: String,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        LocalMediaStore { root: root.into(), url_prefix: url_prefix.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, MediaError> {
        let relative = Path::new(key);
        let safe = !key.is_empty() && relative.components().all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            warn!("Rejected media key '{}'", key);
            return Err(MediaError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    #[instrument(skip(self, data), fields(key = %key, size = data.len()))]
    async fn put(&self, key: &str, data: Bytes, _content_type: Option<&str>) -> Result<(), MediaError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                error!("Failed to create media directory {}: {}", parent.display(), e);
                MediaError::Io(e.to_string())
            })?;
        }
        tokio::fs::write(&path, &data).await.map_err(|e| {
            error!("Failed to write media file {}: {}", path.display(), e);
            MediaError::Io(e.to_string())
        })?;
        debug!("Stored media file {}", path.display());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, key: &str) -> Result<(), MediaError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Media file {} already gone", path.display());
                Ok(())
            }
            Err(e) => {
                error!("Failed to remove media file {}: {}", path.display(), e);
                Err(MediaError::Io(e.to_string()))
            }
        }
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.url_prefix.trim_end_matches('/'), key)
    }
}
