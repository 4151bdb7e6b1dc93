use super::{outcome, step_planner};
use crate::domain::a101_sync_run;
use crate::shared::jobs::{BackendHealth, JobRegistry, SchedulerState, SyncJobError};
use crate::shared::progress::ProgressTracker;
use crate::shared::realtime::RealtimePublisher;
use contracts::domain::a101_sync_run::aggregate::{SyncRun, SyncStatus};
use contracts::shared::events::{Pipeline, RealtimeEvent, RefreshPayload, StartSyncPayload};
use contracts::usecases::u601_sync_to_winbooks::{
    AbortCallback, ProgressSnapshot, SuccessCallback,
};
use std::sync::Arc;
use uuid::Uuid;

/// Executor for the Winbooks synchronisation use case.
///
/// Enqueueing checks preconditions and dispatches a task; the task itself
/// only brings the run to the point where the external client takes over.
/// The run is finished later through the success/abort callbacks.
#[derive(Clone)]
pub struct WinbooksSyncExecutor {
    registry: Arc<JobRegistry>,
    scheduler: Arc<SchedulerState>,
    health: Arc<dyn BackendHealth>,
    tracker: ProgressTracker,
    publisher: RealtimePublisher,
}

impl WinbooksSyncExecutor {
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

    /// Enqueue the run. Returns false without dispatching when a task for
    /// this run is already live; refuses when the scheduler is inactive or
    /// the external client is offline.
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

    /// Single catch point of the job: any failure inside the sync sequence
    /// lands on the run as an Error with the message, plus a refresh event
    /// so observers re-fetch.
    async fn start_sync_job(&self, run: SyncRun) {
        let id = run.base.id.value();

        // A retried run keeps its record; stale error text must not
        // survive into the new attempt.
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
                .publish(Pipeline::Winbooks.refresh_event(RefreshPayload {
                    sync_doc_name: run.base.name.clone(),
                }));
        }

        self.registry.release(&run.base.name);
    }

    /// Bring the run to the hand-over point: mark it in progress, plan the
    /// step budget, and announce the run to the external client.
    async fn run_sync(&self, run: &SyncRun) -> anyhow::Result<()> {
        let id = run.base.id.value();
        a101_sync_run::repository::set_status(id, SyncStatus::InProgress).await?;

        let total = step_planner::plan_total(run);
        self.tracker.init_progress(&run.base.name, total).await?;
        self.tracker
            .update_progress(&run.base.name, 1, "Starting synchronisation...")
            .await?;

        self.publisher
            .publish(RealtimeEvent::StartSync(StartSyncPayload {
                sync_doc_name: run.base.name.clone(),
                sync_customers: run.sync_customers,
                sync_suppliers: run.sync_suppliers,
                sync_sales_invoices: run.sync_sales_invoices,
                sync_purchase_invoices: run.sync_purchase_invoices,
                sync_si_up_to: run.sync_si_up_to,
                sync_pi_up_to: run.sync_pi_up_to,
                ..Default::default()
            }));
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

    /// Success callback from the external client
    pub async fn handle_success(
        &self,
        run_id: Uuid,
        callback: SuccessCallback,
    ) -> Result<(), SyncJobError> {
        let run = a101_sync_run::repository::get_by_id(run_id)
            .await
            .map_err(SyncJobError::Other)?
            .ok_or(SyncJobError::RunNotFound)?;
        outcome::apply_success(&run, callback, &self.publisher)
            .await
            .map_err(SyncJobError::Other)
    }

    /// Abort callback from the external client
    pub async fn handle_abort(
        &self,
        run_id: Uuid,
        callback: AbortCallback,
    ) -> Result<(), SyncJobError> {
        let run = a101_sync_run::repository::get_by_id(run_id)
            .await
            .map_err(SyncJobError::Other)?
            .ok_or(SyncJobError::RunNotFound)?;
        outcome::apply_abort(&run, callback, &self.publisher)
            .await
            .map_err(SyncJobError::Other)
    }
}
