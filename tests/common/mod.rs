#![allow(dead_code)]

use axum::extract::ConnectInfo;
use axum_test::TestServer;
use chrono::Utc;
use shortlink::application::services::CodeGeneratorConfig;
use shortlink::config::RateLimits;
use shortlink::domain::click_worker::run_click_worker;
use shortlink::domain::clock::ManualClock;
use shortlink::infrastructure::cache::MemoryCache;
use shortlink::infrastructure::persistence::MemoryShortLinkRepository;
use shortlink::routes::router;
use shortlink::state::{AppState, Backends, ServiceSettings};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::Layer;

pub const OWNER: &str = "42";

/// Injects a fixed peer address, as `into_make_service_with_connect_info` would.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub repository: Arc<MemoryShortLinkRepository>,
    pub cache: Arc<MemoryCache>,
    pub clock: Arc<ManualClock>,
}

pub fn settings() -> ServiceSettings {
    ServiceSettings {
        code_generator: CodeGeneratorConfig {
            code_length: 8,
            max_attempts: 10,
        },
        cache_ttl: Duration::from_secs(3600),
        rate_limits: RateLimits::default(),
        behind_proxy: false,
        base_url: "https://s.example.com".to_string(),
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(settings())
}

/// Builds the full router on in-process backends and starts the click worker.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_app_with(settings: ServiceSettings) -> TestApp {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let repository = Arc::new(MemoryShortLinkRepository::with_clock(clock.clone()));
    let cache = Arc::new(MemoryCache::with_clock(clock.clone()));

    let backends = Backends {
        repository: repository.clone(),
        store_health: repository.clone(),
        cache: cache.clone(),
        windows: cache.clone(),
        cache_health: cache.clone(),
        clock: clock.clone(),
    };

    let (state, click_rx) = AppState::new(backends, settings);
    tokio::spawn(run_click_worker(click_rx, repository.clone(), 4));

    let app = router(state.clone()).layer(MockConnectInfoLayer);
    let server = TestServer::new(app).unwrap();

    TestApp {
        server,
        state,
        repository,
        cache,
        clock,
    }
}

/// Polls until `check` holds or roughly a second has passed.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
