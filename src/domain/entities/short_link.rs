//! ShortLink entity representing a code → target mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A short link with owner and click metadata.
///
/// `code` and `target` never change after creation. Only `click_count` is
/// mutated, and only by click accounting, so a cached copy is always valid to
/// serve even when its count lags the durable store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortLink {
    pub id: i64,
    pub code: String,
    pub target: String,
    pub owner_id: i64,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ShortLink {
    /// Creates a new ShortLink instance.
    pub fn new(
        id: i64,
        code: String,
        target: String,
        owner_id: i64,
        click_count: i64,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            code,
            target,
            owner_id,
            click_count,
            created_at,
            expires_at,
        }
    }

    /// Returns true if the link has an expiry that is at or before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }
}

/// Input data for inserting a new short link.
#[derive(Debug, Clone)]
pub struct NewShortLink {
    pub code: String,
    pub target: String,
    pub owner_id: i64,
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn link(expires_at: Option<DateTime<Utc>>) -> ShortLink {
        ShortLink::new(
            1,
            "abc123XY".to_string(),
            "https://example.com".to_string(),
            7,
            0,
            Utc::now(),
            expires_at,
        )
    }

    #[test]
    fn test_link_without_expiry_never_expires() {
        let l = link(None);
        assert!(!l.is_expired_at(Utc::now() + Duration::days(3650)));
    }

    #[test]
    fn test_link_expires_at_boundary() {
        let at = Utc::now();
        let l = link(Some(at));

        assert!(!l.is_expired_at(at - Duration::seconds(1)));
        assert!(l.is_expired_at(at));
    }

    #[test]
    fn test_link_json_shape() {
        let l = link(None);
        let json = serde_json::to_value(&l).unwrap();

        assert_eq!(json["code"], "abc123XY");
        assert_eq!(json["target"], "https://example.com");
        assert_eq!(json["owner_id"], 7);
        assert_eq!(json["click_count"], 0);
        assert!(json["expires_at"].is_null());

        let back: ShortLink = serde_json::from_value(json).unwrap();
        assert_eq!(back, l);
    }
}
