//! Redis cache adapter.

use ::redis::aio::ConnectionManager;
use ::redis::{AsyncCommands, Client};
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

use crate::todo::ports::{CacheError, CacheResult, CacheStore};

/// Redis-backed cache store.
///
/// Values are stored as plain strings with `SET key value EX ttl`. The
/// connection manager reconnects transparently after connection loss.
#[derive(Clone)]
pub struct RedisCacheStore {
    conn_manager: ConnectionManager,
}

impl RedisCacheStore {
    /// Connects to Redis.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., "redis://127.0.0.1:6379/0")
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Backend`] if the URL is invalid or the
    /// connection cannot be established.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        let client = Client::open(redis_url).map_err(CacheError::backend)?;
        let conn_manager = ConnectionManager::new(client)
            .await
            .map_err(CacheError::backend)?;
        info!("connected to Redis");
        Ok(Self { conn_manager })
    }
}

/// Converts a TTL to whole seconds, rounding sub-second values up to one.
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn_manager.clone();
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(CacheError::backend)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.conn_manager.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds(ttl))
            .await
            .map_err(CacheError::backend)
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.conn_manager.clone();
        conn.del::<_, ()>(key).await.map_err(CacheError::backend)
    }
}
