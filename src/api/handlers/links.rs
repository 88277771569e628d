//! Handlers for link creation and owner-scoped management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::links::{CreateLinkRequest, ShortLinkResponse};
use crate::api::middleware::owner::OwnerId;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link owned by the calling principal.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "target": "https://example.com/some/long/path",
///   "expires_at": "2030-01-01T00:00:00Z"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "code": "aZ3kP9qX",
///   "short_url": "https://s.example.com/aZ3kP9qX",
///   "target": "https://example.com/some/long/path",
///   "owner_id": 42,
///   "click_count": 0,
///   "created_at": "2025-01-01T12:00:00Z",
///   "expires_at": "2030-01-01T00:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - 400 if the body fails validation or the expiry is in the past
/// - 401 if `X-User-Id` is missing or malformed
/// - 500 with `code_space_exhausted` if no free code was found
pub async fn create_link_handler(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<Json<ShortLinkResponse>, AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .generate(&payload.target, owner_id, payload.expires_at)
        .await?;

    let short_url = state.short_url(&link.code);

    Ok(Json(ShortLinkResponse::new(link, short_url)))
}

/// Lists the caller's live links, newest first.
///
/// # Endpoint
///
/// `GET /api/links`
///
/// An owner with no links gets an empty array.
pub async fn list_links_handler(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
) -> Result<Json<Vec<ShortLinkResponse>>, AppError> {
    let links = state.link_service.list_owned(owner_id).await?;

    let body = links
        .into_iter()
        .map(|link| {
            let short_url = state.short_url(&link.code);
            ShortLinkResponse::new(link, short_url)
        })
        .collect();

    Ok(Json(body))
}

/// Returns one of the caller's links with its click count.
///
/// # Endpoint
///
/// `GET /api/links/{code}`
///
/// Does not count as a click.
///
/// # Errors
///
/// - 403 if the link belongs to another owner
/// - 404 if the code is unknown, deleted or expired
pub async fn get_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
) -> Result<Json<ShortLinkResponse>, AppError> {
    let link = state.link_service.get_owned(&code, owner_id).await?;
    let short_url = state.short_url(&link.code);

    Ok(Json(ShortLinkResponse::new(link, short_url)))
}

/// Soft-deletes one of the caller's links.
///
/// # Endpoint
///
/// `DELETE /api/links/{code}`
///
/// The code stops resolving immediately and is never reissued.
///
/// # Errors
///
/// - 403 if the link belongs to another owner
/// - 404 if the code is unknown, expired or already deleted
pub async fn delete_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
) -> Result<StatusCode, AppError> {
    state.link_service.delete_owned(&code, owner_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
