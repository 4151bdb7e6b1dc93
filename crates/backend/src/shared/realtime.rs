use contracts::shared::events::RealtimeEvent;
use tokio::sync::broadcast;

/// Fan-out of realtime events to in-process observers.
///
/// Events are fire-and-forget: with no subscriber attached the send result
/// is dropped. Every published event is also traced, which doubles as the
/// observable record in deployments without a push transport.
#[derive(Clone)]
pub struct RealtimePublisher {
    tx: broadcast::Sender<RealtimeEvent>,
}

impl RealtimePublisher {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn publish(&self, event: RealtimeEvent) {
        tracing::info!(
            sync_doc_name = event.sync_doc_name(),
            event = ?event,
            "realtime event"
        );
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.tx.subscribe()
    }
}

impl Default for RealtimePublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::shared::events::{Pipeline, RefreshPayload};

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let publisher = RealtimePublisher::new();
        let mut rx = publisher.subscribe();
        publisher.publish(Pipeline::Winbooks.refresh_event(RefreshPayload {
            sync_doc_name: "run".into(),
        }));
        let event = rx.recv().await.unwrap();
        assert_eq!(event.sync_doc_name(), "run");
    }

    #[test]
    fn publishing_without_subscribers_is_a_no_op() {
        let publisher = RealtimePublisher::new();
        publisher.publish(Pipeline::Farandsoft.refresh_event(RefreshPayload {
            sync_doc_name: "run".into(),
        }));
    }
}
