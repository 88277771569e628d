//! Repository trait for the durable short link store.

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Durable, authoritative store of short links.
///
/// The store owns the uniqueness of `code`; callers never lock a code
/// in-process and rely on [`AppError::Conflict`] instead.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgShortLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryShortLinkRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortLinkRepository: Send + Sync {
    /// Inserts a new short link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the code already exists.
    /// Returns [`AppError::Unavailable`] or [`AppError::Internal`] on store failures.
    async fn insert(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Finds a live link by code.
    ///
    /// Deleted and expired links are reported as `Ok(None)`, the same as codes
    /// that never existed.
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError>;

    /// Lists the owner's live links, newest first.
    async fn find_by_owner(&self, owner_id: i64) -> Result<Vec<ShortLink>, AppError>;

    /// Marks a link as deleted.
    ///
    /// The code stays reserved: a later insert with the same code still
    /// conflicts. Returns `false` if no live link had this code.
    async fn soft_delete(&self, code: &str) -> Result<bool, AppError>;

    /// Adds one to the link's click count.
    ///
    /// Implemented as a pure increment in the store, so concurrent calls
    /// commute. Incrementing an unknown code is not an error.
    async fn increment_click_count(&self, code: &str) -> Result<(), AppError>;
}
