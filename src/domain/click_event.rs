//! Click event model for asynchronous click accounting.

use tokio::sync::mpsc;

/// Sending half of the click accounting queue.
pub type ClickSender = mpsc::UnboundedSender<ClickEvent>;

/// Receiving half of the click accounting queue.
pub type ClickReceiver = mpsc::UnboundedReceiver<ClickEvent>;

/// A single successful resolution that should bump a link's click count.
///
/// Sent from the resolver to [`crate::domain::click_worker::run_click_worker`]
/// without waiting for the outcome. Sending is synchronous, so once the
/// resolver has queued the event, dropping the request does not cancel it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub code: String,
}

impl ClickEvent {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// Creates the click accounting queue.
pub fn channel() -> (ClickSender, ClickReceiver) {
    mpsc::unbounded_channel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_delivers_events_in_order() {
        let (tx, mut rx) = channel();

        tx.send(ClickEvent::new("first")).unwrap();
        tx.send(ClickEvent::new("second")).unwrap();

        assert_eq!(rx.recv().await.unwrap().code, "first");
        assert_eq!(rx.recv().await.unwrap().code, "second");
    }
}
