//! Shared application state injected into every handler.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::{
    CodeGeneratorConfig, LinkService, RateLimitService, ResolverService,
};
use crate::config::{Config, RateLimits};
use crate::domain::click_event::{self, ClickReceiver, ClickSender};
use crate::domain::clock::Clock;
use crate::domain::health::HealthProbe;
use crate::domain::repositories::ShortLinkRepository;
use crate::infrastructure::cache::{CacheService, SlidingWindowStore};

/// Storage backends the services are built on.
pub struct Backends {
    pub repository: Arc<dyn ShortLinkRepository>,
    pub store_health: Arc<dyn HealthProbe>,
    pub cache: Arc<dyn CacheService>,
    pub windows: Arc<dyn SlidingWindowStore>,
    pub cache_health: Arc<dyn HealthProbe>,
    pub clock: Arc<dyn Clock>,
}

/// Per-component settings split out of [`Config`].
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub code_generator: CodeGeneratorConfig,
    pub cache_ttl: Duration,
    pub rate_limits: RateLimits,
    pub behind_proxy: bool,
    pub base_url: String,
}

impl From<&Config> for ServiceSettings {
    fn from(config: &Config) -> Self {
        Self {
            code_generator: config.code_generator(),
            cache_ttl: config.cache_ttl(),
            rate_limits: config.rate_limits,
            behind_proxy: config.behind_proxy,
            base_url: config.base_url.clone(),
        }
    }
}

/// Handles to the core services plus the settings the HTTP layer needs.
///
/// Cheap to clone: every field is an `Arc`, a channel sender or a small copy type.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub resolver: Arc<ResolverService>,
    pub rate_limiter: Arc<RateLimitService>,
    pub click_sender: ClickSender,
    pub store_health: Arc<dyn HealthProbe>,
    pub cache_health: Arc<dyn HealthProbe>,
    pub rate_limits: RateLimits,
    pub behind_proxy: bool,
    pub base_url: String,
}

impl AppState {
    /// Wires the services together.
    ///
    /// Returns the receiving end of the click queue, which the caller hands
    /// to [`crate::domain::click_worker::run_click_worker`].
    pub fn new(backends: Backends, settings: ServiceSettings) -> (Self, ClickReceiver) {
        let (click_sender, click_rx) = click_event::channel();

        let link_service = LinkService::new(
            backends.repository.clone(),
            backends.cache.clone(),
            backends.clock.clone(),
            settings.code_generator,
        );

        let resolver = ResolverService::new(
            backends.repository,
            backends.cache,
            click_sender.clone(),
            settings.cache_ttl,
            backends.clock.clone(),
        );

        let rate_limiter = RateLimitService::new(
            backends.windows,
            backends.clock,
            settings.rate_limits.count_rejected,
        );

        let state = Self {
            link_service: Arc::new(link_service),
            resolver: Arc::new(resolver),
            rate_limiter: Arc::new(rate_limiter),
            click_sender,
            store_health: backends.store_health,
            cache_health: backends.cache_health,
            rate_limits: settings.rate_limits,
            behind_proxy: settings.behind_proxy,
            base_url: settings.base_url,
        };

        (state, click_rx)
    }

    /// Builds the short URL for `code` under the configured base URL.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), code)
    }
}
