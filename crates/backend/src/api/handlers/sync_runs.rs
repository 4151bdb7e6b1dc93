use axum::extract::Path;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{a101_sync_run, a102_sync_stamp};
use contracts::domain::a101_sync_run::aggregate::{SyncRun, SyncRunDto};

/// POST /api/sync_run
pub async fn create(Json(dto): Json<SyncRunDto>) -> Result<Json<SyncRun>, StatusCode> {
    match a101_sync_run::service::create(dto).await {
        Ok(run) => Ok(Json(run)),
        Err(e) => {
            tracing::error!("Failed to create sync run: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/sync_run
pub async fn list_all() -> Result<Json<Vec<SyncRun>>, StatusCode> {
    match a101_sync_run::service::list_all().await {
        Ok(runs) => Ok(Json(runs)),
        Err(e) => {
            tracing::error!("Failed to list sync runs: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/sync_run/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<SyncRun>, StatusCode> {
    let uuid = Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    match a101_sync_run::service::get_by_id(uuid).await {
        Ok(Some(run)) => Ok(Json(run)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to load sync run {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GuardCancelRequest {
    pub doctype: String,
    pub name: String,
}

/// POST /api/a102/guard_cancel
///
/// Called by the ERP before cancelling a document; answers 409 when the
/// document was already exported and must not be cancelled.
pub async fn guard_cancel(
    Json(request): Json<GuardCancelRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    match a102_sync_stamp::service::guard_cancel(&request.doctype, &request.name).await {
        Ok(Ok(())) => Ok(StatusCode::OK),
        Ok(Err(refusal)) => Err((StatusCode::CONFLICT, refusal.to_string())),
        Err(e) => {
            tracing::error!("Failed to check sync stamp: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "sync stamp lookup failed".to_string(),
            ))
        }
    }
}
