use super::outcome;
use crate::domain::a101_sync_run;
use crate::shared::jobs::{BackendHealth, JobRegistry, SchedulerState, SyncJobError};
use crate::shared::progress::ProgressTracker;
use crate::shared::realtime::RealtimePublisher;
use contracts::domain::a101_sync_run::aggregate::{SyncRun, SyncStatus};
use contracts::shared::events::{Pipeline, RealtimeEvent, RefreshPayload, StartSyncPayload};
use contracts::usecases::u601_sync_to_winbooks::ProgressSnapshot;
use contracts::usecases::u602_sync_to_farandsoft::StatusCallback;
use std::sync::Arc;
use uuid::Uuid;

/// Executor for the Farandsoft synchronisation use case.
///
/// Same enqueue machinery as the Winbooks executor, but the external
/// client drives the whole run: no step budget is planned up front, the
/// progress bar starts at 0/0 and only the tick messages matter.
#[derive(Clone)]
pub struct FarandsoftSyncExecutor {
    registry: Arc<JobRegistry>,
    scheduler: Arc<SchedulerState>,
    health: Arc<dyn BackendHealth>,
    tracker: ProgressTracker,
    publisher: RealtimePublisher,
}

impl FarandsoftSyncExecutor {
    pub fn new(
        registry: Arc<JobRegistry>,
        scheduler: Arc<SchedulerState>,
        health: Arc<dyn BackendHealth>,
        tracker: ProgressTracker,
        publisher: RealtimePublisher,
    ) -> Self {
        Self {
            registry,
            scheduler,
            health,
            tracker,
            publisher,
        }
    }

    pub async fn queue_sync_job(&self, run_id: Uuid) -> Result<bool, SyncJobError> {
        let run = a101_sync_run::repository::get_by_id(run_id)
            .await
            .map_err(SyncJobError::Other)?
            .ok_or(SyncJobError::RunNotFound)?;

        if !self.scheduler.allows_dispatch() {
            return Err(SyncJobError::SchedulerInactive);
        }
        if !self.health.is_online() {
            return Err(SyncJobError::BackendOffline);
        }
        if !self.registry.try_register(&run.base.name) {
            tracing::info!(name = %run.base.name, "sync job already queued, skipping");
            return Ok(false);
        }

        let executor = self.clone();
        tokio::spawn(async move {
            executor.start_sync_job(run).await;
        });
        Ok(true)
    }

    async fn start_sync_job(&self, run: SyncRun) {
        let id = run.base.id.value();

        if run.status == SyncStatus::Error {
            if let Err(e) = a101_sync_run::repository::set_error_message(id, None).await {
                tracing::error!("failed to clear stale error message: {e:#}");
            }
        }

        if let Err(e) = self.run_sync(&run).await {
            tracing::error!(name = %run.base.name, "sync job failed: {e:#}");
            let message = format!("{e:#}");
            if let Err(e) = a101_sync_run::repository::set_status(id, SyncStatus::Error).await {
                tracing::error!("failed to mark run as Error: {e:#}");
            }
            if let Err(e) =
                a101_sync_run::repository::set_error_message(id, Some(message)).await
            {
                tracing::error!("failed to store error message: {e:#}");
            }
            self.publisher
                .publish(Pipeline::Farandsoft.refresh_event(RefreshPayload {
                    sync_doc_name: run.base.name.clone(),
                }));
        }

        self.registry.release(&run.base.name);
    }

    async fn run_sync(&self, run: &SyncRun) -> anyhow::Result<()> {
        let id = run.base.id.value();
        a101_sync_run::repository::set_status(id, SyncStatus::InProgress).await?;

        self.tracker.init_progress(&run.base.name, 0).await?;

        self.publisher
            .publish(RealtimeEvent::StartSync(StartSyncPayload {
                sync_doc_name: run.base.name.clone(),
                sync_customers: run.sync_customers,
                sync_sales_orders: run.sync_sales_orders,
                sync_items: run.sync_items,
                sync_from_date: run.sync_from_date,
                ..Default::default()
            }));

        self.tracker
            .update_progress(&run.base.name, 1, "Starting synchronisation...")
            .await?;
        Ok(())
    }

    pub async fn get_progress(
        &self,
        run_id: Uuid,
    ) -> Result<Option<ProgressSnapshot>, SyncJobError> {
        let run = a101_sync_run::repository::get_by_id(run_id)
            .await
            .map_err(SyncJobError::Other)?
            .ok_or(SyncJobError::RunNotFound)?;
        self.tracker
            .get_progress(&run.base.name)
            .await
            .map_err(SyncJobError::Other)
    }

    /// Final status callback from the external client
    pub async fn handle_status(
        &self,
        run_id: Uuid,
        callback: StatusCallback,
    ) -> Result<(), SyncJobError> {
        let run = a101_sync_run::repository::get_by_id(run_id)
            .await
            .map_err(SyncJobError::Other)?
            .ok_or(SyncJobError::RunNotFound)?;
        outcome::apply_status(&run, callback, &self.publisher)
            .await
            .map_err(SyncJobError::Other)
    }

    /// Mid-run error reported by the external client
    pub async fn handle_append_error(
        &self,
        run_id: Uuid,
        message: &str,
    ) -> Result<(), SyncJobError> {
        let run = a101_sync_run::repository::get_by_id(run_id)
            .await
            .map_err(SyncJobError::Other)?
            .ok_or(SyncJobError::RunNotFound)?;
        outcome::apply_append_error(&run, message)
            .await
            .map_err(SyncJobError::Other)
    }
}
