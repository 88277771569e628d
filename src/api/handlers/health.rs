//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok", "message": "Connected" },
///     "cache": { "status": "ok", "message": "Connected" },
///     "click_queue": { "status": "ok", "message": "Accepting events" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let (database, cache) = tokio::join!(
        state.store_health.is_healthy(),
        state.cache_health.is_healthy()
    );

    let checks = HealthChecks {
        database: probe_status(database, "Database"),
        cache: probe_status(cache, "Cache"),
        click_queue: check_click_queue(&state),
    };

    let all_healthy = checks.database.is_ok() && checks.cache.is_ok() && checks.click_queue.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks,
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

fn probe_status(healthy: bool, component: &str) -> CheckStatus {
    if healthy {
        CheckStatus::ok("Connected")
    } else {
        CheckStatus::error(format!("{} unreachable", component))
    }
}

/// The queue is only closed once the click worker has stopped.
fn check_click_queue(state: &AppState) -> CheckStatus {
    if state.click_sender.is_closed() {
        CheckStatus::error("Click queue is closed")
    } else {
        CheckStatus::ok("Accepting events")
    }
}
