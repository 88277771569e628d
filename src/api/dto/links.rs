//! DTOs for link creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::ShortLink;

/// Request to create a short link.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// Destination address (must be a valid HTTP/HTTPS URL).
    #[validate(url(message = "Invalid URL format"), length(max = 2048))]
    pub target: String,

    /// Optional expiry. After this time the code resolves as not found.
    pub expires_at: Option<DateTime<Utc>>,
}

/// The created link as returned to the caller.
#[derive(Debug, Serialize)]
pub struct ShortLinkResponse {
    pub code: String,
    pub short_url: String,
    pub target: String,
    pub owner_id: i64,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ShortLinkResponse {
    pub fn new(link: ShortLink, short_url: String) -> Self {
        Self {
            code: link.code,
            short_url,
            target: link.target,
            owner_id: link.owner_id,
            click_count: link.click_count,
            created_at: link.created_at,
            expires_at: link.expires_at,
        }
    }
}
