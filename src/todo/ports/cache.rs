//! Cache port: string values under string keys with expiry.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Key/value cache with per-entry expiry.
///
/// Callers treat every failure as non-fatal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the value under `key`, or `None` on a miss or expired entry.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Removes `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> CacheResult<()>;
}

/// Errors returned by cache adapters.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// The backing cache rejected or failed the command.
    #[error("cache backend error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl CacheError {
    /// Wraps a backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
