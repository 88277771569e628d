mod common;

use axum::http::StatusCode;
use chrono::Duration;
use shortlink::config::{RateLimitPolicy, RateLimits};
use shortlink::domain::entities::NewShortLink;
use shortlink::domain::repositories::ShortLinkRepository;
use shortlink::state::ServiceSettings;

fn tight_redirect_limit(behind_proxy: bool, count_rejected: bool) -> ServiceSettings {
    ServiceSettings {
        rate_limits: RateLimits {
            redirect: RateLimitPolicy::new(3, 10),
            count_rejected,
            ..RateLimits::default()
        },
        behind_proxy,
        ..common::settings()
    }
}

async fn seed(app: &common::TestApp) {
    app.repository
        .insert(NewShortLink {
            code: "abc12345".to_string(),
            target: "https://example.com/".to_string(),
            owner_id: 1,
            expires_at: None,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_remaining_counts_down_then_rejects() {
    let app = common::spawn_app_with(tight_redirect_limit(false, true));
    seed(&app).await;

    for expected in ["2", "1", "0"] {
        let response = app.server.get("/abc12345").await;
        response.assert_status(StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.header("x-ratelimit-limit"), "3");
        assert_eq!(response.header("x-ratelimit-remaining"), expected);
    }

    let response = app.server.get("/abc12345").await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.header("x-ratelimit-remaining"), "0");
    assert!(response.headers().contains_key("x-ratelimit-reset"));

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "too_many_requests");
}

#[tokio::test]
async fn test_rejected_request_is_not_resolved() {
    let app = common::spawn_app_with(tight_redirect_limit(false, true));
    seed(&app).await;

    for _ in 0..3 {
        app.server.get("/abc12345").await;
    }
    app.server
        .get("/abc12345")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    assert!(common::eventually(|| app.repository.click_count("abc12345") == Some(3)).await);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(app.repository.click_count("abc12345"), Some(3));
}

#[tokio::test]
async fn test_allowed_again_after_window() {
    let app = common::spawn_app_with(tight_redirect_limit(false, true));
    seed(&app).await;

    for _ in 0..4 {
        app.server.get("/abc12345").await;
    }
    app.server
        .get("/abc12345")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    app.clock.advance(Duration::seconds(10));

    let response = app.server.get("/abc12345").await;
    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("x-ratelimit-remaining"), "2");
}

#[tokio::test]
async fn test_route_classes_have_independent_budgets() {
    let app = common::spawn_app_with(tight_redirect_limit(false, true));
    seed(&app).await;

    for _ in 0..4 {
        app.server.get("/abc12345").await;
    }
    app.server
        .get("/abc12345")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    app.server.get("/health").await.assert_status_ok();
}

#[tokio::test]
async fn test_forwarded_clients_have_independent_budgets() {
    let app = common::spawn_app_with(tight_redirect_limit(true, true));
    seed(&app).await;

    for _ in 0..3 {
        app.server
            .get("/abc12345")
            .add_header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .await
            .assert_status(StatusCode::TEMPORARY_REDIRECT);
    }
    app.server
        .get("/abc12345")
        .add_header("x-forwarded-for", "203.0.113.7")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    app.server
        .get("/abc12345")
        .add_header("x-forwarded-for", "198.51.100.20")
        .await
        .assert_status(StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_forwarded_header_ignored_without_proxy() {
    let app = common::spawn_app_with(tight_redirect_limit(false, true));
    seed(&app).await;

    for ip in ["203.0.113.1", "203.0.113.2", "203.0.113.3"] {
        app.server
            .get("/abc12345")
            .add_header("x-forwarded-for", ip)
            .await
            .assert_status(StatusCode::TEMPORARY_REDIRECT);
    }

    app.server
        .get("/abc12345")
        .add_header("x-forwarded-for", "203.0.113.4")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_rejected_requests_released_when_not_counted() {
    let app = common::spawn_app_with(tight_redirect_limit(false, false));
    seed(&app).await;

    for _ in 0..3 {
        app.server.get("/abc12345").await;
    }
    for _ in 0..5 {
        app.server
            .get("/abc12345")
            .await
            .assert_status(StatusCode::TOO_MANY_REQUESTS);
    }

    assert_eq!(app.cache.window_len("ratelimit:redirect:ip:127.0.0.1"), 3);
}
