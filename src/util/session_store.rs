//! Revoked session registry.
//!
//! A session token stays valid until it expires unless its `jti` is revoked
//! here. Entries only need to outlive the token they refer to.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::util::redis::{RedisError, RedisService};

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Session store backend error: {0}")]
    Backend(String),
}

impl From<RedisError> for SessionStoreError {
    fn from(err: RedisError) -> Self {
        SessionStoreError::Backend(err.to_string())
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn revoke(&self, jti: &str, ttl_secs: u64) -> Result<(), SessionStoreError>;
    async fn is_revoked(&self, jti: &str) -> Result<bool, SessionStoreError>;
}

pub struct RedisSessionStore {
    redis: RedisService,
}

impl RedisSessionStore {
    pub fn new(redis: RedisService) -> Self {
        RedisSessionStore { redis }
    }

    fn key(&self, jti: &str) -> String {
        self.redis.key(&["session", "revoked", jti])
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    #[instrument(skip(self))]
    async fn revoke(&self, jti: &str, ttl_secs: u64) -> Result<(), SessionStoreError> {
        self.redis.set_marker(&self.key(jti), ttl_secs).await?;
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, SessionStoreError> {
        Ok(self.redis.exists(&self.key(jti)).await?)
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    revoked: RwLock<HashMap<String, Instant>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn revoke(&self, jti: &str, ttl_secs: u64) -> Result<(), SessionStoreError> {
        let mut revoked = self.revoked.write().await;
        let now = Instant::now();
        revoked.retain(|_, until| *until > now);
        revoked.insert(jti.to_string(), now + Duration::from_secs(ttl_secs.max(1)));
        debug!(revoked = revoked.len(), "Session revoked");
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, SessionStoreError> {
        let revoked = self.revoked.read().await;
        Ok(revoked.get(jti).is_some_and(|until| *until > Instant::now()))
    }
}
