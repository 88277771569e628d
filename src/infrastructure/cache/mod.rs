//! Cache store used for fast resolution and rate-limit windows.
//!
//! Provides the [`CacheService`] and [`SlidingWindowStore`] traits with two
//! implementations:
//! - [`RedisCache`] - Production Redis-backed store
//! - [`MemoryCache`] - In-process store for tests and single-node setups

mod memory_cache;
mod redis_cache;
mod service;

pub use memory_cache::{MemoryCache, run_purge_loop};
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService, SlidingWindowStore};

#[cfg(test)]
pub use service::{MockCacheService, MockSlidingWindowStore};
