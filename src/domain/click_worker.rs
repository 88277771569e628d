//! Background worker applying click increments to the durable store.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::domain::click_event::ClickReceiver;
use crate::domain::repositories::ShortLinkRepository;

/// Drains the click queue until every sender is dropped.
///
/// Each event becomes its own task so a slow store call never delays the next
/// one; `concurrency` caps how many increments are in flight. Failures are
/// logged and counted, never retried.
///
/// Returns only after every increment it started has finished.
pub async fn run_click_worker(
    mut rx: ClickReceiver,
    repository: Arc<dyn ShortLinkRepository>,
    concurrency: usize,
) {
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut in_flight = JoinSet::new();

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let repository = repository.clone();

        in_flight.spawn(async move {
            match repository.increment_click_count(&event.code).await {
                Ok(()) => {
                    metrics::counter!("shortlink_clicks_recorded_total").increment(1);
                    debug!(code = %event.code, "Click recorded");
                }
                Err(e) => {
                    metrics::counter!("shortlink_clicks_failed_total").increment(1);
                    warn!(code = %event.code, error = %e, "Failed to record click");
                }
            }
            drop(permit);
        });

        while in_flight.try_join_next().is_some() {}
    }

    if !in_flight.is_empty() {
        debug!(pending = in_flight.len(), "Queue closed, waiting for in-flight clicks");
    }
    while let Some(result) = in_flight.join_next().await {
        if let Err(e) = result {
            warn!(error = %e, "Click task did not complete");
        }
    }

    info!("Click worker stopped: queue closed");
}
