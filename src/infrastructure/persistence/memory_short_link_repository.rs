//! In-process implementation of the short link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{DashMap, mapref::entry::Entry};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::clock::{Clock, SystemClock};
use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::health::HealthProbe;
use crate::domain::repositories::ShortLinkRepository;
use crate::error::AppError;

#[derive(Debug, Clone)]
struct StoredLink {
    link: ShortLink,
    deleted_at: Option<DateTime<Utc>>,
}

impl StoredLink {
    fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.deleted_at.is_none() && !self.link.is_expired_at(now)
    }
}

/// `DashMap`-backed repository with the same uniqueness semantics as the
/// PostgreSQL table: inserting an existing code yields [`AppError::Conflict`],
/// deleted codes included.
///
/// Creation times and expiry checks use the injected [`Clock`].
pub struct MemoryShortLinkRepository {
    links: DashMap<String, StoredLink>,
    next_id: AtomicI64,
    clock: Arc<dyn Clock>,
}

impl MemoryShortLinkRepository {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            links: DashMap::new(),
            next_id: AtomicI64::new(0),
            clock,
        }
    }

    /// Number of stored links, including expired and deleted ones.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Current click count for `code`, ignoring expiry and deletion.
    pub fn click_count(&self, code: &str) -> Option<i64> {
        self.links.get(code).map(|l| l.link.click_count)
    }
}

impl Default for MemoryShortLinkRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShortLinkRepository for MemoryShortLinkRepository {
    async fn insert(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        match self.links.entry(new_link.code.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "short_links_code_key" }),
            )),
            Entry::Vacant(slot) => {
                let link = ShortLink::new(
                    self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
                    new_link.code,
                    new_link.target,
                    new_link.owner_id,
                    0,
                    self.clock.now(),
                    new_link.expires_at,
                );
                slot.insert(StoredLink {
                    link: link.clone(),
                    deleted_at: None,
                });
                Ok(link)
            }
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        let now = self.clock.now();
        Ok(self
            .links
            .get(code)
            .filter(|l| l.is_live_at(now))
            .map(|l| l.link.clone()))
    }

    async fn find_by_owner(&self, owner_id: i64) -> Result<Vec<ShortLink>, AppError> {
        let now = self.clock.now();
        let mut links: Vec<ShortLink> = self
            .links
            .iter()
            .filter(|l| l.link.owner_id == owner_id && l.is_live_at(now))
            .map(|l| l.link.clone())
            .collect();

        links.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(links)
    }

    async fn soft_delete(&self, code: &str) -> Result<bool, AppError> {
        let Some(mut stored) = self.links.get_mut(code) else {
            return Ok(false);
        };
        if stored.deleted_at.is_some() {
            return Ok(false);
        }

        stored.deleted_at = Some(self.clock.now());
        Ok(true)
    }

    async fn increment_click_count(&self, code: &str) -> Result<(), AppError> {
        if let Some(mut stored) = self.links.get_mut(code) {
            stored.link.click_count += 1;
        }
        Ok(())
    }
}

#[async_trait]
impl HealthProbe for MemoryShortLinkRepository {
    async fn is_healthy(&self) -> bool {
        true
    }
}
