//! Cache-aside resolution of short codes.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::click_event::{ClickEvent, ClickSender};
use crate::domain::clock::Clock;
use crate::domain::entities::ShortLink;
use crate::domain::repositories::ShortLinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Builds the cache key a link is stored under.
pub fn cache_key(code: &str) -> String {
    format!("url:{}", code)
}

/// Resolves short codes through the cache, falling back to the durable store.
///
/// Every successful resolution queues exactly one [`ClickEvent`]. The caller
/// never waits on click accounting.
pub struct ResolverService {
    repository: Arc<dyn ShortLinkRepository>,
    cache: Arc<dyn CacheService>,
    clicks: ClickSender,
    cache_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ResolverService {
    pub fn new(
        repository: Arc<dyn ShortLinkRepository>,
        cache: Arc<dyn CacheService>,
        clicks: ClickSender,
        cache_ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            cache,
            clicks,
            cache_ttl,
            clock,
        }
    }

    /// Looks up `code`, returning `Ok(None)` for unknown, deleted or expired links.
    ///
    /// Cache read failures are treated as a miss. Cache write failures are
    /// logged and ignored. Durable store failures are returned.
    pub async fn resolve(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        let key = cache_key(code);

        if let Some(link) = self.cached(&key).await {
            if link.is_expired_at(self.clock.now()) {
                debug!(code, "Cached link has expired");
                return Ok(None);
            }
            self.record_click(&link.code);
            return Ok(Some(link));
        }

        let Some(link) = self.repository.find_by_code(code).await? else {
            return Ok(None);
        };

        self.populate(&key, &link).await;
        self.record_click(&link.code);

        Ok(Some(link))
    }

    async fn cached(&self, key: &str) -> Option<ShortLink> {
        match self.cache.get(key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<ShortLink>(&bytes) {
                Ok(link) => {
                    metrics::counter!("shortlink_cache_hits_total").increment(1);
                    debug!(key, "Cache HIT");
                    Some(link)
                }
                Err(e) => {
                    metrics::counter!("shortlink_cache_errors_total").increment(1);
                    warn!(key, error = %e, "Discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => {
                metrics::counter!("shortlink_cache_misses_total").increment(1);
                debug!(key, "Cache MISS");
                None
            }
            Err(e) => {
                metrics::counter!("shortlink_cache_errors_total").increment(1);
                warn!(key, error = %e, "Cache read failed, falling back to store");
                None
            }
        }
    }

    async fn populate(&self, key: &str, link: &ShortLink) {
        let ttl = self.ttl_for(link);
        if ttl.is_zero() {
            return;
        }

        let bytes = match serde_json::to_vec(link) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize link for cache");
                return;
            }
        };

        if let Err(e) = self.cache.set_with_ttl(key, &bytes, ttl).await {
            metrics::counter!("shortlink_cache_errors_total").increment(1);
            warn!(key, error = %e, "Failed to cache link");
        }
    }

    /// Caps the cache lifetime at the link's own expiry.
    fn ttl_for(&self, link: &ShortLink) -> Duration {
        match link.expires_at {
            Some(at) => (at - self.clock.now())
                .to_std()
                .map(|left| left.min(self.cache_ttl))
                .unwrap_or(Duration::ZERO),
            None => self.cache_ttl,
        }
    }

    fn record_click(&self, code: &str) {
        if self.clicks.send(ClickEvent::new(code)).is_err() {
            metrics::counter!("shortlink_clicks_failed_total").increment(1);
            warn!(code, "Click queue closed, dropping click");
        }
    }
}
