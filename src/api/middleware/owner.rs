//! Caller identity supplied by the upstream gateway.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde_json::json;

use crate::error::AppError;

/// Header carrying the authenticated principal's id.
pub const OWNER_HEADER: &str = "x-user-id";

/// Id of the principal making the request, read from `X-User-Id`.
///
/// Authentication happens in front of this service; the gateway is trusted
/// to strip any client-supplied value and set its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerId(pub i64);

impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .map(OwnerId)
            .ok_or_else(|| {
                AppError::unauthorized(
                    "Unauthorized",
                    json!({ "reason": "X-User-Id header is missing or invalid" }),
                )
            })
    }
}
