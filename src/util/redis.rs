use crate::config::RedisConfig;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::{debug, error, info, instrument};

/// Shared Redis connection, namespaced by the configured key prefix.
#[derive(Clone)]
pub struct RedisService {
    connection_manager: ConnectionManager,
    config: RedisConfig,
}

impl RedisService {
    /// Connects and pings once, so an unreachable server fails at startup
    #[instrument(skip(config), fields(host = %config.host, port = config.port, db = config.database))]
    pub async fn new(config: RedisConfig) -> Result<Self, RedisError> {
        info!("Initializing Redis service");
        config.validate().map_err(|e| RedisError::ConfigError(e.to_string()))?;

        let client = Client::open(config.get_connection_url()).map_err(|e| {
            error!("Failed to create Redis client: {}", e);
            RedisError::ConnectionError(format!("Client creation failed: {}", e))
        })?;
        let connection_manager = ConnectionManager::new(client).await.map_err(|e| {
            error!("Failed to create Redis connection manager: {}", e);
            RedisError::ConnectionError(format!("Connection manager creation failed: {}", e))
        })?;

        let service = RedisService { connection_manager, config };
        service.ping().await?;
        info!("Redis service initialized");
        Ok(service)
    }

    pub async fn ping(&self) -> Result<(), RedisError> {
        let mut conn = self.connection_manager.clone();
        let reply: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| RedisError::OperationError(format!("Ping failed: {}", e)))?;
        if reply != "PONG" {
            error!("Unexpected ping response: {}", reply);
            return Err(RedisError::OperationError(format!("Unexpected ping response: {}", reply)));
        }
        debug!("Redis ping successful");
        Ok(())
    }

    /// Full key for `parts` under this service's prefix
    pub fn key(&self, parts: &[&str]) -> String {
        self.config.key(parts)
    }

    /// Stores a presence marker under `key` that Redis drops after `ttl_secs`.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn set_marker(&self, key: &str, ttl_secs: u64) -> Result<(), RedisError> {
        let mut conn = self.connection_manager.clone();
        // SET EX rejects a zero TTL
        let _: () = conn.set_ex(key, 1u8, ttl_secs.max(1)).await.map_err(|e| {
            error!("Failed to set marker '{}': {}", key, e);
            RedisError::OperationError(format!("SET EX failed: {}", e))
        })?;
        Ok(())
    }

    pub async fn exists(&self, key: &str) -> Result<bool, RedisError> {
        let mut conn = self.connection_manager.clone();
        conn.exists(key).await.map_err(|e| {
            error!("Failed to check existence of key '{}': {}", key, e);
            RedisError::OperationError(format!("EXISTS failed: {}", e))
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RedisError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Operation error: {0}")]
    OperationError(String),
}
