//! Liveness probe implemented by storage backends for `/health`.

use async_trait::async_trait;

/// Reports whether a backend is reachable.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn is_healthy(&self) -> bool;
}
