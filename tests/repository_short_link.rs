//! PostgreSQL repository tests. Run with `cargo test -- --ignored` and a
//! `DATABASE_URL` pointing at a server where test databases may be created.

use chrono::{Duration, Utc};
use shortlink::domain::entities::NewShortLink;
use shortlink::domain::health::HealthProbe;
use shortlink::domain::repositories::ShortLinkRepository;
use shortlink::error::AppError;
use shortlink::infrastructure::persistence::PgShortLinkRepository;
use sqlx::PgPool;
use std::sync::Arc;

fn new_link(code: &str) -> NewShortLink {
    NewShortLink {
        code: code.to_string(),
        target: "https://example.com/".to_string(),
        owner_id: 7,
        expires_at: None,
    }
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_and_find(pool: PgPool) {
    let repo = PgShortLinkRepository::new(Arc::new(pool));

    let created = repo.insert(new_link("abc123")).await.unwrap();
    assert_eq!(created.code, "abc123");
    assert_eq!(created.owner_id, 7);
    assert_eq!(created.click_count, 0);

    let found = repo.find_by_code("abc123").await.unwrap().unwrap();
    assert_eq!(found, created);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_code_is_conflict(pool: PgPool) {
    let repo = PgShortLinkRepository::new(Arc::new(pool));

    repo.insert(new_link("dup001")).await.unwrap();
    let err = repo.insert(new_link("dup001")).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict { .. }));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_find_skips_expired_and_deleted(pool: PgPool) {
    let repo = PgShortLinkRepository::new(Arc::new(pool.clone()));

    let mut expired = new_link("old001");
    expired.expires_at = Some(Utc::now() - Duration::minutes(1));
    repo.insert(expired).await.unwrap();

    repo.insert(new_link("del001")).await.unwrap();
    sqlx::query("UPDATE short_links SET deleted_at = NOW() WHERE code = $1")
        .bind("del001")
        .execute(&pool)
        .await
        .unwrap();

    assert!(repo.find_by_code("old001").await.unwrap().is_none());
    assert!(repo.find_by_code("del001").await.unwrap().is_none());
    assert!(repo.find_by_code("never1").await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_increment_click_count(pool: PgPool) {
    let repo = PgShortLinkRepository::new(Arc::new(pool));

    repo.insert(new_link("clk001")).await.unwrap();
    repo.increment_click_count("clk001").await.unwrap();
    repo.increment_click_count("clk001").await.unwrap();

    let link = repo.find_by_code("clk001").await.unwrap().unwrap();
    assert_eq!(link.click_count, 2);

    // Unknown codes are a no-op.
    repo.increment_click_count("nope01").await.unwrap();
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_health_probe(pool: PgPool) {
    let repo = PgShortLinkRepository::new(Arc::new(pool));
    assert!(repo.is_healthy().await);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_find_by_owner(pool: PgPool) {
    let repo = PgShortLinkRepository::new(Arc::new(pool));

    repo.insert(new_link("own001")).await.unwrap();
    repo.insert(new_link("own002")).await.unwrap();
    let mut other = new_link("oth001");
    other.owner_id = 8;
    repo.insert(other).await.unwrap();
    repo.soft_delete("own001").await.unwrap();

    let links = repo.find_by_owner(7).await.unwrap();
    let codes: Vec<&str> = links.iter().map(|l| l.code.as_str()).collect();
    assert_eq!(codes, vec!["own002"]);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_soft_delete_keeps_code_reserved(pool: PgPool) {
    let repo = PgShortLinkRepository::new(Arc::new(pool));

    repo.insert(new_link("sd0001")).await.unwrap();
    assert!(repo.soft_delete("sd0001").await.unwrap());
    assert!(!repo.soft_delete("sd0001").await.unwrap());
    assert!(!repo.soft_delete("never1").await.unwrap());

    assert!(repo.find_by_code("sd0001").await.unwrap().is_none());
    let err = repo.insert(new_link("sd0001")).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict { .. }));
}
