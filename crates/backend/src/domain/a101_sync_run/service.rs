use super::repository;
use chrono::Utc;
use contracts::domain::a101_sync_run::aggregate::{SyncRun, SyncRunDto};
use uuid::Uuid;

/// Create a run from the submitted flags. The name and `sync_datetime`
/// are assigned here, from the same instant.
pub async fn create(dto: SyncRunDto) -> anyhow::Result<SyncRun> {
    let run = SyncRun::new_for_insert(dto, Utc::now());
    repository::insert(&run).await?;
    tracing::info!(name = %run.base.name, "created sync run");
    Ok(run)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<SyncRun>> {
    repository::get_by_id(id).await
}

pub async fn list_all() -> anyhow::Result<Vec<SyncRun>> {
    repository::list_all().await
}
