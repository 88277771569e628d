//! In-process cache and window store.

use super::service::{CacheResult, CacheService, SlidingWindowStore};
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::entities::RateWindowEntry;
use crate::domain::health::HealthProbe;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
struct CachedValue {
    bytes: Vec<u8>,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct WindowSet {
    entries: BTreeSet<(i64, String)>,
    expires_at: Option<DateTime<Utc>>,
}

/// `DashMap`-backed implementation of [`CacheService`] and [`SlidingWindowStore`].
///
/// Expiry is evaluated lazily against the injected [`Clock`]. A window step
/// holds the shard lock for its key for the whole step, which gives the same
/// all-or-nothing behaviour as a Redis `MULTI`/`EXEC` within one process.
///
/// Used by tests and as the fallback store when Redis is not configured.
pub struct MemoryCache {
    values: DashMap<String, CachedValue>,
    windows: DashMap<String, WindowSet>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    /// Creates an empty store driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store driven by `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            values: DashMap::new(),
            windows: DashMap::new(),
            clock,
        }
    }

    /// Remaining time to live of a value, or `None` if absent or expired.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = self.clock.now();
        self.values
            .get(key)
            .and_then(|v| (v.expires_at - now).to_std().ok())
            .filter(|d| !d.is_zero())
    }

    /// Drops every expired value and idle window set.
    ///
    /// Reads already ignore expired keys; this reclaims their memory. Returns
    /// the number of keys removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.values.len() + self.windows.len();

        self.values.retain(|_, v| v.expires_at > now);
        self.windows
            .retain(|_, w| w.expires_at.is_none_or(|e| e > now));

        before.saturating_sub(self.values.len() + self.windows.len())
    }

    /// Number of stored keys, expired or not: `(values, windows)`.
    pub fn key_counts(&self) -> (usize, usize) {
        (self.values.len(), self.windows.len())
    }

    /// Number of live members in a window set.
    pub fn window_len(&self, key: &str) -> usize {
        let now = self.clock.now();
        self.windows
            .get(key)
            .filter(|w| w.expires_at.is_none_or(|e| e > now))
            .map(|w| w.entries.len())
            .unwrap_or(0)
    }
}

/// Calls [`MemoryCache::purge_expired`] every `every` until the task is dropped.
pub async fn run_purge_loop(cache: Arc<MemoryCache>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let removed = cache.purge_expired();
        if removed > 0 {
            debug!(removed, "Purged expired in-process cache keys");
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

fn expiry(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let now = self.clock.now();

        if let Some(value) = self.values.get(key) {
            if value.expires_at > now {
                return Ok(Some(value.bytes.clone()));
            }
        } else {
            return Ok(None);
        }

        self.values.remove_if(key, |_, v| v.expires_at <= now);
        Ok(None)
    }

    async fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()> {
        let expires_at = expiry(self.clock.now(), ttl);
        self.values.insert(
            key.to_string(),
            CachedValue {
                bytes: value.to_vec(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> CacheResult<()> {
        self.values.remove(key);
        Ok(())
    }
}

#[async_trait]
impl SlidingWindowStore for MemoryCache {
    async fn record_in_window(
        &self,
        key: &str,
        entry: &RateWindowEntry,
        window_start_ms: i64,
        ttl: Duration,
    ) -> CacheResult<u64> {
        let now = self.clock.now();
        let mut window = self.windows.entry(key.to_string()).or_default();

        if window.expires_at.is_some_and(|e| e <= now) {
            window.entries.clear();
        }

        window.entries.retain(|(score, _)| *score > window_start_ms);
        window
            .entries
            .insert((entry.score_ms, entry.member.clone()));
        let count = window.entries.len() as u64;
        window.expires_at = Some(expiry(now, ttl));

        Ok(count)
    }

    async fn remove_entry(&self, key: &str, member: &str) -> CacheResult<()> {
        if let Some(mut window) = self.windows.get_mut(key) {
            window.entries.retain(|(_, m)| m != member);
        }
        Ok(())
    }
}

#[async_trait]
impl HealthProbe for MemoryCache {
    async fn is_healthy(&self) -> bool {
        true
    }
}
