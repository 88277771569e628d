mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use shortlink::domain::clock::Clock;
use shortlink::domain::entities::NewShortLink;
use shortlink::domain::repositories::ShortLinkRepository;
use shortlink::infrastructure::cache::CacheService;

async fn insert(app: &common::TestApp, code: &str, expires_at: Option<chrono::DateTime<Utc>>) {
    app.repository
        .insert(NewShortLink {
            code: code.to_string(),
            target: "https://example.com/landing".to_string(),
            owner_id: 1,
            expires_at,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_redirect_success() {
    let app = common::spawn_app();
    insert(&app, "abc12345", None).await;

    let response = app.server.get("/abc12345").await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "https://example.com/landing");
}

#[tokio::test]
async fn test_redirect_populates_cache() {
    let app = common::spawn_app();
    insert(&app, "abc12345", None).await;

    app.server
        .get("/abc12345")
        .await
        .assert_status(StatusCode::TEMPORARY_REDIRECT);

    let ttl = app.cache.ttl("url:abc12345").unwrap();
    assert!(ttl <= std::time::Duration::from_secs(3600));
    assert!(app.cache.get("url:abc12345").await.unwrap().is_some());
}

#[tokio::test]
async fn test_redirect_not_found() {
    let app = common::spawn_app();

    let response = app.server.get("/nonexistent").await;
    response.assert_status_not_found();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "not_found");

    // A code created after a miss resolves: misses are never cached.
    insert(&app, "nonexistent", None).await;
    app.server
        .get("/nonexistent")
        .await
        .assert_status(StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_redirect_unknown_code_stays_not_found() {
    let app = common::spawn_app();

    app.server.get("/missing1").await.assert_status_not_found();
    app.server.get("/missing1").await.assert_status_not_found();

    assert!(app.cache.get("url:missing1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_redirect_expired_link() {
    let app = common::spawn_app();
    insert(&app, "expired1", Some(Utc::now() - Duration::minutes(1))).await;

    app.server.get("/expired1").await.assert_status_not_found();
}

#[tokio::test]
async fn test_cached_link_stops_resolving_at_expiry() {
    let app = common::spawn_app();
    insert(&app, "soon1234", Some(app.clock.now() + Duration::minutes(5))).await;

    app.server
        .get("/soon1234")
        .await
        .assert_status(StatusCode::TEMPORARY_REDIRECT);

    app.clock.advance(Duration::minutes(5));

    app.server.get("/soon1234").await.assert_status_not_found();
}
