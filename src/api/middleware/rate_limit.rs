//! Sliding-window rate limiting middleware.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::config::{RateLimitClass, RateLimitPolicy};
use crate::domain::entities::RateDecision;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Admits or rejects a request against its class budget.
///
/// The client key is `{class}:ip:{address}`, so each endpoint class keeps an
/// independent window per client. Every response, admitted or not, carries
/// `X-RateLimit-Limit`, `X-RateLimit-Remaining` and `X-RateLimit-Reset`
/// (unix seconds).
///
/// # Errors
///
/// Returns `429 Too Many Requests` once the window is full and
/// `503 Service Unavailable` if the window store cannot be reached. Requests
/// are never admitted without a successful check.
///
/// # Example
///
/// ```rust,ignore
/// let api = Router::new()
///     .route("/links", post(create_link_handler))
///     .route_layer(middleware::from_fn_with_state(
///         (state.clone(), RateLimitClass::Api),
///         rate_limit::layer,
///     ));
/// ```
pub async fn layer(
    State((state, class)): State<(AppState, RateLimitClass)>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let policy = state.rate_limits.policy(class);
    let client = client_ip(req.headers(), req.extensions(), state.behind_proxy)
        .unwrap_or_else(|| "unknown".to_string());
    let key = format!("{}:ip:{}", class.as_str(), client);

    let decision = state
        .rate_limiter
        .check_rate(&key, policy.limit, policy.window)
        .await?;

    let mut response = if decision.allowed {
        next.run(req).await
    } else {
        tracing::info!(class = class.as_str(), client = %client, "Rate limit exceeded");
        AppError::too_many_requests(
            "Rate limit exceeded",
            json!({
                "limit": policy.limit,
                "window_seconds": policy.window.as_secs(),
                "reset_at": decision.reset_at,
            }),
        )
        .into_response()
    };

    apply_headers(response.headers_mut(), policy, &decision);

    Ok(response)
}

fn apply_headers(headers: &mut HeaderMap, policy: RateLimitPolicy, decision: &RateDecision) {
    headers.insert("x-ratelimit-limit", HeaderValue::from(policy.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));
    headers.insert(
        "x-ratelimit-reset",
        HeaderValue::from(decision.reset_at.timestamp()),
    );
}
