//! Redis-backed cache and window store.

use super::service::{CacheError, CacheResult, CacheService, SlidingWindowStore};
use crate::domain::entities::RateWindowEntry;
use crate::domain::health::HealthProbe;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, info};

/// Redis implementation of [`CacheService`] and [`SlidingWindowStore`].
///
/// Uses `ConnectionManager` for connection reuse and automatic reconnects.
/// Window steps run inside `MULTI`/`EXEC`, so concurrent callers on the same
/// key never observe a half-applied step.
#[derive(Clone)]
pub struct RedisCache {
    client: ConnectionManager,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Connection`] if the URL is invalid, the connection
    /// cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url)
            .map_err(|e| CacheError::Connection(format!("Failed to create Redis client: {}", e)))?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(format!("Failed to connect to Redis: {}", e)))?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::Connection(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self { client: manager })
    }
}

/// Whole seconds for `EXPIRE`/`SET EX`, never below one.
fn ttl_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let mut conn = self.client.clone();

        conn.get::<_, Option<Vec<u8>>>(key)
            .await
            .map_err(|e| CacheError::Operation(format!("GET {}: {}", key, e)))
    }

    async fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()> {
        let mut conn = self.client.clone();
        let secs = ttl_seconds(ttl);

        conn.set_ex::<_, _, ()>(key, value, secs)
            .await
            .map_err(|e| CacheError::Operation(format!("SET {}: {}", key, e)))?;

        debug!("Cache SET: {} (TTL: {}s)", key, secs);
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.client.clone();

        let deleted = conn
            .del::<_, i32>(key)
            .await
            .map_err(|e| CacheError::Operation(format!("DEL {}: {}", key, e)))?;

        if deleted > 0 {
            debug!("Cache INVALIDATE: {}", key);
        }
        Ok(())
    }
}

#[async_trait]
impl SlidingWindowStore for RedisCache {
    async fn record_in_window(
        &self,
        key: &str,
        entry: &RateWindowEntry,
        window_start_ms: i64,
        ttl: Duration,
    ) -> CacheResult<u64> {
        let mut conn = self.client.clone();

        let (count,): (u64,) = redis::pipe()
            .atomic()
            .zrembyscore(key, "-inf", window_start_ms)
            .ignore()
            .zadd(key, &entry.member, entry.score_ms)
            .ignore()
            .zcard(key)
            .expire(key, ttl_seconds(ttl) as i64)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Operation(format!("window step on {}: {}", key, e)))?;

        Ok(count)
    }

    async fn remove_entry(&self, key: &str, member: &str) -> CacheResult<()> {
        let mut conn = self.client.clone();

        conn.zrem::<_, _, ()>(key, member)
            .await
            .map_err(|e| CacheError::Operation(format!("ZREM {}: {}", key, e)))
    }
}

#[async_trait]
impl HealthProbe for RedisCache {
    async fn is_healthy(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
