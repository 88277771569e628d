//! Cache store traits and error types.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::domain::entities::RateWindowEntry;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),
    #[error("Cache operation error: {0}")]
    Operation(String),
    #[error("Cache serialization error: {0}")]
    Serialization(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value store with per-key TTL.
///
/// Unlike a fail-open cache, implementations report transport failures; the
/// resolver decides to treat them as misses.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed store
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the stored bytes, or `Ok(None)` on a miss or expired key.
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Stores `value` under `key`, expiring after `ttl`.
    async fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()>;

    /// Removes `key`. Used when a link is deleted. Absent keys are not an error.
    async fn invalidate(&self, key: &str) -> CacheResult<()>;
}

/// Time-ordered set operations backing the sliding-window rate limiter.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SlidingWindowStore: Send + Sync {
    /// Atomically applies one window step to the set at `key`:
    ///
    /// 1. removes members scored at or before `window_start_ms`
    /// 2. adds `entry`
    /// 3. counts the members, including `entry`
    /// 4. sets the key to expire after `ttl`
    ///
    /// Either all four take effect or none do. Returns the count from step 3.
    async fn record_in_window(
        &self,
        key: &str,
        entry: &RateWindowEntry,
        window_start_ms: i64,
        ttl: Duration,
    ) -> CacheResult<u64>;

    /// Removes a single member, used when rejected requests must not occupy
    /// a slot in the window.
    async fn remove_entry(&self, key: &str, member: &str) -> CacheResult<()>;
}
