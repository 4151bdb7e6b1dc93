use super::repository;
use chrono::{DateTime, Utc};
use contracts::domain::a101_sync_run::log::DocumentResult;

/// A stamped document may no longer be cancelled in the ERP; the export
/// on the accounting side cannot be recalled.
#[derive(Debug, thiserror::Error)]
#[error("{name} has already been synchronised with Winbooks on {sync_date} and can no longer be cancelled.")]
pub struct AlreadySynchronised {
    pub doctype: String,
    pub name: String,
    pub sync_date: String,
}

/// Stamp every document of a committed run with the run's sync datetime
pub async fn stamp_documents(
    docs: &[DocumentResult],
    sync_date: DateTime<Utc>,
) -> anyhow::Result<()> {
    for doc in docs {
        repository::upsert(&doc.doctype, &doc.name, sync_date).await?;
    }
    Ok(())
}

pub async fn is_synchronised(doctype: &str, name: &str) -> anyhow::Result<bool> {
    Ok(repository::get(doctype, name).await?.is_some())
}

/// Cancel-guard called by the ERP before cancelling a document
pub async fn guard_cancel(doctype: &str, name: &str) -> anyhow::Result<Result<(), AlreadySynchronised>> {
    match repository::get(doctype, name).await? {
        Some(stamp) => Ok(Err(AlreadySynchronised {
            doctype: stamp.doctype,
            name: stamp.name,
            sync_date: stamp
                .sync_date
                .map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_else(|| "an earlier run".to_string()),
        })),
        None => Ok(Ok(())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a101_sync_run;
    use crate::shared::realtime::RealtimePublisher;
    use crate::usecases::u601_sync_to_winbooks::outcome;
    use contracts::domain::a101_sync_run::aggregate::{SyncRunDto, SyncStatus};
    use contracts::usecases::u601_sync_to_winbooks::SuccessCallback;

    // The sqlite connection is a process-wide singleton, so the whole
    // persistence flow lives in one test.
    #[tokio::test]
    async fn success_callback_stamps_documents_and_blocks_cancel() {
        let db_file =
            std::env::temp_dir().join(format!("a102_stamp_{}.db", uuid::Uuid::new_v4()));
        crate::shared::data::db::initialize_database(db_file.to_str())
            .await
            .unwrap();

        let run = a101_sync_run::service::create(SyncRunDto {
            sync_sales_invoices: true,
            ..Default::default()
        })
        .await
        .unwrap();

        let callback = SuccessCallback {
            docs: vec![DocumentResult::new("Sales Invoice", "SI-1")],
        };
        outcome::apply_success(&run, callback, &RealtimePublisher::new())
            .await
            .unwrap();

        let reloaded = a101_sync_run::service::get_by_id(run.base.id.value())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.status, SyncStatus::Success);

        assert!(is_synchronised("Sales Invoice", "SI-1").await.unwrap());
        let stamp = repository::get("Sales Invoice", "SI-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            stamp.sync_date.map(|d| d.timestamp()),
            run.sync_datetime.map(|d| d.timestamp())
        );

        let refusal = guard_cancel("Sales Invoice", "SI-1")
            .await
            .unwrap()
            .unwrap_err();
        assert!(refusal
            .to_string()
            .contains("can no longer be cancelled"));

        assert!(guard_cancel("Sales Invoice", "SI-2")
            .await
            .unwrap()
            .is_ok());

        std::fs::remove_file(&db_file).ok();
    }
}
