use axum::extract::Path;
use axum::http::StatusCode;
use axum::Json;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::shared::jobs::{
    BackendHealth, CachedLiveness, JobRegistry, SchedulerState, SyncJobError,
};
use crate::shared::kv::ProgressStore;
use crate::shared::progress::ProgressTracker;
use crate::shared::realtime::RealtimePublisher;
use crate::usecases::u601_sync_to_winbooks::{self, WinbooksSyncExecutor};
use crate::usecases::u602_sync_to_farandsoft::FarandsoftSyncExecutor;
use contracts::shared::entity_registry::EntityType;
use contracts::shared::events::Pipeline;
use contracts::usecases::u601_sync_to_winbooks::{
    AbortCallback, EnqueueResponse, InvoicePayload, ProgressSnapshot, SuccessCallback,
    VatComputation,
};
use contracts::usecases::u602_sync_to_farandsoft::{AppendErrorRequest, StatusCallback};

/// External client liveness goes stale without a heartbeat for this long
const LIVENESS_TTL: Duration = Duration::from_secs(300);

/// Executors and the shared liveness flag, wired once at startup
pub struct SyncRuntime {
    pub winbooks: WinbooksSyncExecutor,
    pub farandsoft: FarandsoftSyncExecutor,
    pub liveness: Arc<CachedLiveness>,
    pub scheduler: Arc<SchedulerState>,
}

static SYNC_RUNTIME: OnceCell<SyncRuntime> = OnceCell::new();

pub fn initialize(
    store: Arc<dyn ProgressStore>,
    publisher: RealtimePublisher,
) -> anyhow::Result<()> {
    let registry = Arc::new(JobRegistry::new());
    let scheduler = Arc::new(SchedulerState::new(true));
    let liveness = Arc::new(CachedLiveness::new(LIVENESS_TTL));
    let health: Arc<dyn BackendHealth> = liveness.clone();

    let winbooks = WinbooksSyncExecutor::new(
        registry.clone(),
        scheduler.clone(),
        health.clone(),
        ProgressTracker::new(store.clone(), publisher.clone(), Pipeline::Winbooks),
        publisher.clone(),
    );
    let farandsoft = FarandsoftSyncExecutor::new(
        registry,
        scheduler.clone(),
        health,
        ProgressTracker::new(store, publisher.clone(), Pipeline::Farandsoft),
        publisher,
    );

    SYNC_RUNTIME
        .set(SyncRuntime {
            winbooks,
            farandsoft,
            liveness,
            scheduler,
        })
        .map_err(|_| anyhow::anyhow!("sync runtime already initialized"))
}

fn runtime() -> &'static SyncRuntime {
    SYNC_RUNTIME.get().expect("Sync runtime not initialized")
}

fn status_for(e: &SyncJobError) -> StatusCode {
    match e {
        SyncJobError::RunNotFound => StatusCode::NOT_FOUND,
        SyncJobError::SchedulerInactive | SyncJobError::BackendOffline => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        SyncJobError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn parse_id(id: &str) -> Result<Uuid, (StatusCode, String)> {
    Uuid::parse_str(id).map_err(|_| (StatusCode::BAD_REQUEST, "invalid run id".to_string()))
}

fn job_failure(e: SyncJobError) -> (StatusCode, String) {
    let status = status_for(&e);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("sync job failed: {e:#}");
    }
    (status, e.to_string())
}

// ============================================================================
// UseCase u601: Synchronise to Winbooks
// ============================================================================

/// POST /api/u601/sync/:id/start
pub async fn u601_start_sync(
    Path(id): Path<String>,
) -> Result<Json<EnqueueResponse>, (StatusCode, String)> {
    let run_id = parse_id(&id)?;
    match runtime().winbooks.queue_sync_job(run_id).await {
        Ok(queued) => Ok(Json(EnqueueResponse { queued })),
        Err(e) => Err(job_failure(e)),
    }
}

/// GET /api/u601/sync/:id/progress
pub async fn u601_get_progress(
    Path(id): Path<String>,
) -> Result<Json<ProgressSnapshot>, (StatusCode, String)> {
    let run_id = parse_id(&id)?;
    match runtime().winbooks.get_progress(run_id).await {
        Ok(Some(snapshot)) => Ok(Json(snapshot)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "no progress recorded".to_string())),
        Err(e) => Err(job_failure(e)),
    }
}

/// POST /api/u601/sync/:id/success
pub async fn u601_set_success(
    Path(id): Path<String>,
    Json(callback): Json<SuccessCallback>,
) -> Result<StatusCode, (StatusCode, String)> {
    let run_id = parse_id(&id)?;
    match runtime().winbooks.handle_success(run_id, callback).await {
        Ok(()) => Ok(StatusCode::OK),
        Err(e) => Err(job_failure(e)),
    }
}

/// POST /api/u601/sync/:id/abort
pub async fn u601_abort(
    Path(id): Path<String>,
    Json(callback): Json<AbortCallback>,
) -> Result<StatusCode, (StatusCode, String)> {
    let run_id = parse_id(&id)?;
    match runtime().winbooks.handle_abort(run_id, callback).await {
        Ok(()) => Ok(StatusCode::OK),
        Err(e) => Err(job_failure(e)),
    }
}

/// POST /api/u601/invoices/vat
pub async fn u601_compute_vat(
    Json(invoice): Json<InvoicePayload>,
) -> Result<Json<VatComputation>, (StatusCode, String)> {
    match u601_sync_to_winbooks::vat::compute_vat(&invoice) {
        Ok(computation) => Ok(Json(computation)),
        Err(e) => Err((StatusCode::BAD_REQUEST, e.to_string())),
    }
}

/// GET /api/u601/fetch_plan/:entity_type
///
/// Field list and default filters the external client applies when
/// fetching documents of this type from the ERP.
pub async fn u601_fetch_plan(
    Path(entity_type): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let entity: EntityType =
        serde_json::from_value(serde_json::Value::String(entity_type.clone())).map_err(|_| {
            (
                StatusCode::NOT_FOUND,
                format!("unknown entity type: {entity_type}"),
            )
        })?;
    Ok(Json(serde_json::json!({
        "doctype": entity.doctype(),
        "fields": entity.fields(),
        "filters": entity.default_filters(),
    })))
}

// ============================================================================
// UseCase u602: Synchronise to Farandsoft
// ============================================================================

/// POST /api/u602/sync/:id/start
pub async fn u602_start_sync(
    Path(id): Path<String>,
) -> Result<Json<EnqueueResponse>, (StatusCode, String)> {
    let run_id = parse_id(&id)?;
    match runtime().farandsoft.queue_sync_job(run_id).await {
        Ok(queued) => Ok(Json(EnqueueResponse { queued })),
        Err(e) => Err(job_failure(e)),
    }
}

/// GET /api/u602/sync/:id/progress
pub async fn u602_get_progress(
    Path(id): Path<String>,
) -> Result<Json<ProgressSnapshot>, (StatusCode, String)> {
    let run_id = parse_id(&id)?;
    match runtime().farandsoft.get_progress(run_id).await {
        Ok(Some(snapshot)) => Ok(Json(snapshot)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "no progress recorded".to_string())),
        Err(e) => Err(job_failure(e)),
    }
}

/// POST /api/u602/sync/:id/status
pub async fn u602_set_status(
    Path(id): Path<String>,
    Json(callback): Json<StatusCallback>,
) -> Result<StatusCode, (StatusCode, String)> {
    let run_id = parse_id(&id)?;
    match runtime().farandsoft.handle_status(run_id, callback).await {
        Ok(()) => Ok(StatusCode::OK),
        Err(e) => Err(job_failure(e)),
    }
}

/// POST /api/u602/sync/:id/append_error
pub async fn u602_append_error(
    Path(id): Path<String>,
    Json(request): Json<AppendErrorRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    let run_id = parse_id(&id)?;
    match runtime()
        .farandsoft
        .handle_append_error(run_id, &request.error_message)
        .await
    {
        Ok(()) => Ok(StatusCode::OK),
        Err(e) => Err(job_failure(e)),
    }
}

// ============================================================================
// External client heartbeat
// ============================================================================

/// POST /api/backend/ping
pub async fn backend_ping() -> &'static str {
    runtime().liveness.mark_online();
    "pong"
}
