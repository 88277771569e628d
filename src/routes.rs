//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`      - Short link redirect (`redirect` rate-limit class)
//! - `GET  /health`      - Health check: store, cache, click queue (`health` class)
//! - `/api/links`        - Create, list, show and delete the caller's links (`api` class)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-client sliding window, one budget per route class
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{rate_limit, tracing};
use crate::config::RateLimitClass;
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Builds the router with every route and its rate-limit class.
pub fn router(state: AppState) -> Router {
    let api_router = limited(api::routes::api_routes(), &state, RateLimitClass::Api);

    let redirect_router = limited(
        Router::new().route("/{code}", get(redirect_handler)),
        &state,
        RateLimitClass::Redirect,
    );

    let health_router = limited(
        Router::new().route("/health", get(health_handler)),
        &state,
        RateLimitClass::Health,
    );

    Router::new()
        .merge(redirect_router)
        .merge(health_router)
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer())
}

fn limited(
    routes: Router<AppState>,
    state: &AppState,
    class: RateLimitClass,
) -> Router<AppState> {
    routes.route_layer(middleware::from_fn_with_state(
        (state.clone(), class),
        rate_limit::layer,
    ))
}

/// [`router`] wrapped so that `/api/links/` and `/api/links` route the same.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}
