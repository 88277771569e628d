//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its target.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// Resolution goes through [`crate::application::services::ResolverService`],
/// which serves from the cache when it can and queues a click for every
/// successful lookup. The redirect is a 307 so browsers keep coming back
/// through the service and every visit is counted.
///
/// # Errors
///
/// Returns 404 Not Found for unknown, deleted and expired codes alike.
/// Returns 503 Service Unavailable if the durable store cannot be reached.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    match state.resolver.resolve(&code).await? {
        Some(link) => Ok(Redirect::temporary(&link.target)),
        None => Err(AppError::not_found(
            "Link not found",
            json!({ "code": code }),
        )),
    }
}
