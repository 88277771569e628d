//! Short link creation with collision-safe code generation, and owner-scoped
//! management of existing links.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use super::resolver_service::cache_key;
use crate::domain::clock::Clock;
use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::ShortLinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::{generate_code, is_reserved};
use crate::utils::target_url::normalize_target;

/// Settings for the identifier generator.
#[derive(Debug, Clone, Copy)]
pub struct CodeGeneratorConfig {
    /// Number of characters in every generated code.
    pub code_length: usize,
    /// Insert attempts before giving up with [`AppError::Exhausted`].
    pub max_attempts: usize,
}

impl Default for CodeGeneratorConfig {
    fn default() -> Self {
        Self {
            code_length: 8,
            max_attempts: 10,
        }
    }
}

/// Service for creating short links.
///
/// Uniqueness rests entirely on the durable store: a candidate code is
/// inserted directly, and a [`AppError::Conflict`] simply means "draw again".
/// There is no read-before-write and no in-process lock, so any number of
/// processes can generate concurrently.
pub struct LinkService {
    repository: Arc<dyn ShortLinkRepository>,
    cache: Arc<dyn CacheService>,
    clock: Arc<dyn Clock>,
    config: CodeGeneratorConfig,
    next_code: fn(usize) -> String,
}

impl LinkService {
    /// Creates a new link service.
    ///
    /// `cache` is the resolver's cache; deleting a link evicts its entry.
    pub fn new(
        repository: Arc<dyn ShortLinkRepository>,
        cache: Arc<dyn CacheService>,
        clock: Arc<dyn Clock>,
        config: CodeGeneratorConfig,
    ) -> Self {
        Self {
            repository,
            cache,
            clock,
            config,
            next_code: generate_code,
        }
    }

    /// Creates a short link owned by `owner_id` pointing at `target`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the target is not an http(s) URL or
    /// `expires_at` is not in the future.
    ///
    /// Returns [`AppError::Exhausted`] if every attempt collided with an
    /// existing code.
    ///
    /// Any other store error aborts immediately and is returned unchanged.
    pub async fn generate(
        &self,
        target: &str,
        owner_id: i64,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ShortLink, AppError> {
        let target = normalize_target(target).map_err(|e| {
            AppError::bad_request("Invalid target URL", json!({ "reason": e.to_string() }))
        })?;

        if let Some(at) = expires_at
            && at <= self.clock.now()
        {
            return Err(AppError::bad_request(
                "Expiry must be in the future",
                json!({ "expires_at": at }),
            ));
        }

        for attempt in 1..=self.config.max_attempts {
            let code = (self.next_code)(self.config.code_length);
            if is_reserved(&code) {
                debug!(attempt, code = %code, "Generated a reserved code, generating a new one");
                continue;
            }

            let new_link = NewShortLink {
                code,
                target: target.clone(),
                owner_id,
                expires_at,
            };

            match self.repository.insert(new_link).await {
                Ok(link) => {
                    info!(code = %link.code, owner_id, attempt, "Short link created");
                    return Ok(link);
                }
                Err(e) if e.is_conflict() => {
                    metrics::counter!("shortlink_code_collisions_total").increment(1);
                    debug!(attempt, "Duplicate short code, generating a new one");
                }
                Err(e) => return Err(e),
            }
        }

        warn!(
            attempts = self.config.max_attempts,
            code_length = self.config.code_length,
            "Gave up generating a unique short code"
        );

        Err(AppError::exhausted(
            "Failed to generate unique code",
            json!({
                "reason": "Too many collisions",
                "attempts": self.config.max_attempts,
            }),
        ))
    }

    /// Returns the live link `code` if `owner_id` owns it.
    ///
    /// Reads the durable store directly and records no click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown, deleted and expired codes.
    /// Returns [`AppError::Forbidden`] if the link belongs to someone else.
    pub async fn get_owned(&self, code: &str, owner_id: i64) -> Result<ShortLink, AppError> {
        let link = self
            .repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "code": code })))?;

        if link.owner_id != owner_id {
            return Err(AppError::forbidden(
                "Link belongs to another owner",
                json!({ "code": code }),
            ));
        }

        Ok(link)
    }

    /// Lists the live links owned by `owner_id`, newest first.
    pub async fn list_owned(&self, owner_id: i64) -> Result<Vec<ShortLink>, AppError> {
        self.repository.find_by_owner(owner_id).await
    }

    /// Soft-deletes `code` on behalf of its owner and evicts it from the cache.
    ///
    /// The code is never handed out again. A failed eviction is logged; the
    /// stale entry then lives until its TTL runs out.
    ///
    /// # Errors
    ///
    /// Same as [`LinkService::get_owned`].
    pub async fn delete_owned(&self, code: &str, owner_id: i64) -> Result<(), AppError> {
        self.get_owned(code, owner_id).await?;

        if !self.repository.soft_delete(code).await? {
            return Err(AppError::not_found(
                "Link not found or already deleted",
                json!({ "code": code }),
            ));
        }

        let key = cache_key(code);
        if let Err(e) = self.cache.invalidate(&key).await {
            metrics::counter!("shortlink_cache_errors_total").increment(1);
            warn!(key = %key, error = %e, "Failed to invalidate cache after delete");
        }

        info!(code, owner_id, "Short link deleted");
        Ok(())
    }
}
