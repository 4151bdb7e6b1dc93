//! Progress tracking for synchronisation runs.
//!
//! Counters live in the key-value store under the run name, as text values,
//! so that an external client reading the same hash sees plain strings.
//! Every increment also publishes a progress event on the run's pipeline.

use crate::shared::kv::ProgressStore;
use crate::shared::realtime::RealtimePublisher;
use anyhow::Context;
use contracts::shared::events::{Pipeline, ProgressPayload};
use contracts::usecases::u601_sync_to_winbooks::ProgressSnapshot;
use std::sync::Arc;

const CURRENT_FIELD: &str = "progress_current";
const TOTAL_FIELD: &str = "progress_total";

#[derive(Clone)]
pub struct ProgressTracker {
    store: Arc<dyn ProgressStore>,
    publisher: RealtimePublisher,
    pipeline: Pipeline,
}

impl ProgressTracker {
    pub fn new(
        store: Arc<dyn ProgressStore>,
        publisher: RealtimePublisher,
        pipeline: Pipeline,
    ) -> Self {
        Self {
            store,
            publisher,
            pipeline,
        }
    }

    /// Reset the counters for a fresh run: zero out of `total` steps
    pub async fn init_progress(&self, sync_doc_name: &str, total: u32) -> anyhow::Result<()> {
        self.cache_progress(sync_doc_name, 0, Some(total)).await
    }

    /// Write counters to the store without publishing
    pub async fn cache_progress(
        &self,
        sync_doc_name: &str,
        current: u32,
        total: Option<u32>,
    ) -> anyhow::Result<()> {
        self.store
            .hset(sync_doc_name, CURRENT_FIELD, &current.to_string())
            .await?;
        if let Some(total) = total {
            self.store
                .hset(sync_doc_name, TOTAL_FIELD, &total.to_string())
                .await?;
        }
        Ok(())
    }

    /// Advance the counter by `step` and publish a progress event
    pub async fn update_progress(
        &self,
        sync_doc_name: &str,
        step: u32,
        message: &str,
    ) -> anyhow::Result<()> {
        let total = self
            .read_field(sync_doc_name, TOTAL_FIELD)
            .await?
            .unwrap_or(0);
        let current = self
            .read_field(sync_doc_name, CURRENT_FIELD)
            .await?
            .unwrap_or(0)
            + step;
        self.cache_progress(sync_doc_name, current, None).await?;

        self.publisher
            .publish(self.pipeline.progress_event(ProgressPayload {
                sync_doc_name: sync_doc_name.to_string(),
                current,
                total,
                message: message.to_string(),
            }));
        Ok(())
    }

    /// Counters as last cached, or None for a run that never initialized
    pub async fn get_progress(
        &self,
        sync_doc_name: &str,
    ) -> anyhow::Result<Option<ProgressSnapshot>> {
        let total = match self.read_field(sync_doc_name, TOTAL_FIELD).await? {
            Some(total) => total,
            None => return Ok(None),
        };
        let current = self
            .read_field(sync_doc_name, CURRENT_FIELD)
            .await?
            .unwrap_or(0);
        Ok(Some(ProgressSnapshot {
            sync_doc_name: sync_doc_name.to_string(),
            current,
            total,
        }))
    }

    async fn read_field(&self, sync_doc_name: &str, field: &str) -> anyhow::Result<Option<u32>> {
        match self.store.hget(sync_doc_name, field).await? {
            Some(text) => {
                let value = text
                    .parse::<u32>()
                    .with_context(|| format!("non-numeric {} for {}", field, sync_doc_name))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::kv::MemoryProgressStore;
    use contracts::shared::events::RealtimeEvent;

    fn tracker(publisher: RealtimePublisher) -> ProgressTracker {
        ProgressTracker::new(
            Arc::new(MemoryProgressStore::new()),
            publisher,
            Pipeline::Winbooks,
        )
    }

    #[tokio::test]
    async fn counters_are_stored_as_text() {
        let store = Arc::new(MemoryProgressStore::new());
        let tracker = ProgressTracker::new(
            store.clone(),
            RealtimePublisher::new(),
            Pipeline::Winbooks,
        );
        tracker.init_progress("run", 6).await.unwrap();

        assert_eq!(
            store.hget("run", "progress_current").await.unwrap(),
            Some("0".to_string())
        );
        assert_eq!(
            store.hget("run", "progress_total").await.unwrap(),
            Some("6".to_string())
        );
    }

    #[tokio::test]
    async fn update_increments_and_publishes() {
        let publisher = RealtimePublisher::new();
        let mut rx = publisher.subscribe();
        let tracker = tracker(publisher);

        tracker.init_progress("run", 6).await.unwrap();
        tracker
            .update_progress("run", 1, "Starting synchronisation...")
            .await
            .unwrap();
        tracker
            .update_progress("run", 2, "Fetching customers")
            .await
            .unwrap();

        let snapshot = tracker.get_progress("run").await.unwrap().unwrap();
        assert_eq!(snapshot.current, 3);
        assert_eq!(snapshot.total, 6);

        match rx.recv().await.unwrap() {
            RealtimeEvent::WinbooksSyncProgress(p) => {
                assert_eq!(p.current, 1);
                assert_eq!(p.message, "Starting synchronisation...");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn uninitialized_run_has_no_snapshot() {
        let tracker = tracker(RealtimePublisher::new());
        assert!(tracker.get_progress("missing").await.unwrap().is_none());
    }
}
