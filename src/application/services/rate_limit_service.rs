//! Sliding-window admission control.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, error, warn};

use crate::domain::clock::Clock;
use crate::domain::entities::{RateDecision, RateWindowEntry};
use crate::error::AppError;
use crate::infrastructure::cache::SlidingWindowStore;

/// Per-client sliding-window rate limiter.
///
/// Each check appends a uniquely keyed entry scored at the current time,
/// prunes everything at or before the window start and counts what is left,
/// all in one atomic step on the [`SlidingWindowStore`]. A store failure
/// rejects the request.
pub struct RateLimitService {
    store: Arc<dyn SlidingWindowStore>,
    clock: Arc<dyn Clock>,
    count_rejected: bool,
}

impl RateLimitService {
    /// Creates a limiter.
    ///
    /// When `count_rejected` is false, the entry written by a rejected check
    /// is removed again so that only admitted requests occupy the window.
    pub fn new(
        store: Arc<dyn SlidingWindowStore>,
        clock: Arc<dyn Clock>,
        count_rejected: bool,
    ) -> Self {
        Self {
            store,
            clock,
            count_rejected,
        }
    }

    /// Checks whether `client_key` may make another request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] if the window store cannot be updated.
    pub async fn check_rate(
        &self,
        client_key: &str,
        limit: u32,
        window: Duration,
    ) -> Result<RateDecision, AppError> {
        let key = format!("ratelimit:{}", client_key);
        let now = self.clock.now();
        let out_of_range =
            || AppError::internal("Rate limit window out of range", json!({ "window": window.as_secs() }));
        let window_span = chrono::Duration::from_std(window).map_err(|_| out_of_range())?;
        let window_start = now.checked_sub_signed(window_span).ok_or_else(out_of_range)?;
        let reset_at = now.checked_add_signed(window_span).ok_or_else(out_of_range)?;
        let window_start_ms = window_start.timestamp_millis();
        let entry = RateWindowEntry::at(now);

        let count = self
            .store
            .record_in_window(&key, &entry, window_start_ms, window)
            .await
            .map_err(|e| {
                error!(key = %key, error = %e, "Rate limit check failed");
                AppError::unavailable("Rate limit check failed", json!({}))
            })?;

        let limit = u64::from(limit);
        let allowed = count <= limit;
        let decision = RateDecision {
            allowed,
            remaining: limit.saturating_sub(count),
            reset_at,
        };

        if !allowed {
            metrics::counter!("shortlink_rate_limit_rejections_total").increment(1);
            debug!(key = %key, count, limit, "Rate limit exceeded");

            if !self.count_rejected
                && let Err(e) = self.store.remove_entry(&key, &entry.member).await
            {
                warn!(key = %key, error = %e, "Failed to release rejected window entry");
            }
        }

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::ManualClock;
    use crate::infrastructure::cache::{CacheError, MemoryCache, MockSlidingWindowStore};
    use chrono::Utc;

    const WINDOW: Duration = Duration::from_secs(10);

    fn limiter(count_rejected: bool) -> (Arc<ManualClock>, Arc<MemoryCache>, RateLimitService) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = Arc::new(MemoryCache::with_clock(clock.clone()));
        let service = RateLimitService::new(store.clone(), clock.clone(), count_rejected);
        (clock, store, service)
    }

    #[tokio::test]
    async fn test_remaining_counts_down_then_rejects() {
        let (_clock, _store, service) = limiter(true);

        let mut remaining = Vec::new();
        for _ in 0..3 {
            let d = service.check_rate("client", 3, WINDOW).await.unwrap();
            assert!(d.allowed);
            remaining.push(d.remaining);
        }
        assert_eq!(remaining, vec![2, 1, 0]);

        let d = service.check_rate("client", 3, WINDOW).await.unwrap();
        assert!(!d.allowed);
        assert_eq!(d.remaining, 0);
    }

    #[tokio::test]
    async fn test_allowed_again_after_window_elapses() {
        let (clock, _store, service) = limiter(true);

        for _ in 0..4 {
            service.check_rate("client", 3, WINDOW).await.unwrap();
        }
        assert!(!service.check_rate("client", 3, WINDOW).await.unwrap().allowed);

        clock.advance(chrono::Duration::seconds(10));

        let d = service.check_rate("client", 3, WINDOW).await.unwrap();
        assert!(d.allowed);
        assert_eq!(d.remaining, 2);
    }

    #[tokio::test]
    async fn test_reset_at_is_one_window_ahead() {
        let (clock, _store, service) = limiter(true);
        let now = clock.now();

        let d = service.check_rate("client", 3, WINDOW).await.unwrap();
        assert_eq!(d.reset_at, now + chrono::Duration::seconds(10));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let (_clock, _store, service) = limiter(true);

        for _ in 0..3 {
            service.check_rate("a", 3, WINDOW).await.unwrap();
        }
        assert!(!service.check_rate("a", 3, WINDOW).await.unwrap().allowed);

        let d = service.check_rate("b", 3, WINDOW).await.unwrap();
        assert!(d.allowed);
        assert_eq!(d.remaining, 2);
    }

    #[tokio::test]
    async fn test_rejected_requests_occupy_window_by_default() {
        let (_clock, store, service) = limiter(true);

        for _ in 0..5 {
            service.check_rate("client", 3, WINDOW).await.unwrap();
        }
        assert_eq!(store.window_len("ratelimit:client"), 5);
    }

    #[tokio::test]
    async fn test_rejected_requests_released_when_not_counted() {
        let (_clock, store, service) = limiter(false);

        for _ in 0..5 {
            service.check_rate("client", 3, WINDOW).await.unwrap();
        }
        assert_eq!(store.window_len("ratelimit:client"), 3);
    }

    #[tokio::test]
    async fn test_store_failure_rejects_with_unavailable() {
        let mut store = MockSlidingWindowStore::new();
        store
            .expect_record_in_window()
            .returning(|_, _, _, _| Err(CacheError::Connection("refused".to_string())));

        let clock = Arc::new(ManualClock::new(Utc::now()));
        let service = RateLimitService::new(Arc::new(store), clock, true);

        let err = service.check_rate("client", 3, WINDOW).await.unwrap_err();
        assert!(matches!(err, AppError::Unavailable { .. }));
        assert_eq!(err.to_string(), "Rate limit check failed");
    }

    #[tokio::test]
    async fn test_unrepresentable_window_is_an_error() {
        let mut store = MockSlidingWindowStore::new();
        store.expect_record_in_window().times(0);

        let clock = Arc::new(ManualClock::new(Utc::now()));
        let service = RateLimitService::new(Arc::new(store), clock, true);

        let err = service
            .check_rate("client", 3, Duration::from_secs(9_000_000_000_000))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
    }
}
