//! Final classification of a Farandsoft run.
//!
//! The external client reports two document lists plus an optional
//! run-level error message; errors may also have been appended while the
//! run was still going, which taints an otherwise clean result.

use crate::domain::a101_sync_run;
use crate::shared::realtime::RealtimePublisher;
use contracts::domain::a101_sync_run::aggregate::{SyncRun, SyncStatus};
use contracts::domain::a101_sync_run::log::{DocStatus, DocumentResult};
use contracts::shared::events::{Pipeline, RefreshPayload};
use contracts::usecases::u602_sync_to_farandsoft::StatusCallback;

pub struct StatusOutcome {
    pub status: SyncStatus,
    pub log: Vec<DocumentResult>,
    pub error_message: Option<String>,
}

/// Classify the run from the callback lists:
/// - both lists non-empty -> Partial;
/// - only errors -> Error;
/// - clean lists but an error was appended mid-run -> Partial;
/// - otherwise Success.
/// A non-empty top-level `error_message` overrides all of that to Error
/// and is persisted on the run.
pub fn classify_status(
    callback: StatusCallback,
    existing_error_message: Option<&str>,
) -> StatusOutcome {
    let mut errors = callback.errors;
    let mut successes = callback.successes;
    for doc in &mut errors {
        if doc.status.is_none() {
            doc.status = Some(DocStatus::Error);
        }
    }
    for doc in &mut successes {
        if doc.status.is_none() {
            doc.status = Some(DocStatus::Success);
        }
    }

    let mut status = if !errors.is_empty() && !successes.is_empty() {
        SyncStatus::Partial
    } else if !errors.is_empty() {
        SyncStatus::Error
    } else if existing_error_message.is_some_and(|m| !m.is_empty()) {
        SyncStatus::Partial
    } else {
        SyncStatus::Success
    };

    let mut log = errors;
    log.append(&mut successes);

    let mut error_message = None;
    if let Some(message) = callback.error_message {
        if !message.is_empty() {
            status = SyncStatus::Error;
            error_message = Some(message);
        }
    }

    StatusOutcome {
        status,
        log,
        error_message,
    }
}

/// Concatenate a mid-run error onto whatever the run already carries
pub fn append_error(existing: Option<&str>, message: &str) -> String {
    match existing {
        Some(prev) if !prev.is_empty() => format!("{}\n{}", prev, message),
        _ => message.to_string(),
    }
}

pub async fn apply_status(
    run: &SyncRun,
    callback: StatusCallback,
    publisher: &RealtimePublisher,
) -> anyhow::Result<()> {
    let id = run.base.id.value();
    let outcome = classify_status(callback, run.error_message.as_deref());

    a101_sync_run::repository::set_status(id, outcome.status).await?;
    a101_sync_run::repository::set_sync_log(id, &outcome.log).await?;
    if outcome.error_message.is_some() {
        a101_sync_run::repository::set_error_message(id, outcome.error_message).await?;
    }

    tracing::info!(
        name = %run.base.name,
        status = outcome.status.as_str(),
        "farandsoft run finished"
    );
    publisher.publish(Pipeline::Farandsoft.refresh_event(RefreshPayload {
        sync_doc_name: run.base.name.clone(),
    }));
    Ok(())
}

pub async fn apply_append_error(run: &SyncRun, message: &str) -> anyhow::Result<()> {
    let id = run.base.id.value();
    let combined = append_error(run.error_message.as_deref(), message);
    a101_sync_run::repository::set_error_message(id, Some(combined)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str) -> DocumentResult {
        DocumentResult::new("Sales Order", name)
    }

    fn callback(
        errors: Vec<DocumentResult>,
        successes: Vec<DocumentResult>,
        error_message: Option<&str>,
    ) -> StatusCallback {
        StatusCallback {
            errors,
            successes,
            error_message: error_message.map(String::from),
        }
    }

    #[test]
    fn only_successes_is_success() {
        let outcome = classify_status(callback(vec![], vec![doc("SO-1")], None), None);
        assert_eq!(outcome.status, SyncStatus::Success);
        assert_eq!(outcome.log[0].status, Some(DocStatus::Success));
    }

    #[test]
    fn only_errors_is_error() {
        let outcome = classify_status(callback(vec![doc("SO-1")], vec![], None), None);
        assert_eq!(outcome.status, SyncStatus::Error);
        assert_eq!(outcome.log[0].status, Some(DocStatus::Error));
    }

    #[test]
    fn mixed_lists_are_partial_with_errors_first() {
        let outcome =
            classify_status(callback(vec![doc("SO-1")], vec![doc("SO-2")], None), None);
        assert_eq!(outcome.status, SyncStatus::Partial);
        assert_eq!(outcome.log[0].name, "SO-1");
        assert_eq!(outcome.log[1].name, "SO-2");
    }

    #[test]
    fn clean_lists_with_appended_error_are_partial() {
        let outcome = classify_status(
            callback(vec![], vec![doc("SO-1")], None),
            Some("item SO-9 could not be priced"),
        );
        assert_eq!(outcome.status, SyncStatus::Partial);
    }

    #[test]
    fn top_level_error_message_overrides_to_error() {
        let outcome = classify_status(
            callback(vec![], vec![doc("SO-1")], Some("connection dropped")),
            None,
        );
        assert_eq!(outcome.status, SyncStatus::Error);
        assert_eq!(outcome.error_message.as_deref(), Some("connection dropped"));
    }

    #[test]
    fn empty_top_level_error_message_is_ignored() {
        let outcome = classify_status(callback(vec![], vec![doc("SO-1")], Some("")), None);
        assert_eq!(outcome.status, SyncStatus::Success);
        assert!(outcome.error_message.is_none());
    }

    #[test]
    fn append_error_accumulates_line_by_line() {
        let first = append_error(None, "first failure");
        assert_eq!(first, "first failure");
        let second = append_error(Some(&first), "second failure");
        assert_eq!(second, "first failure\nsecond failure");
    }
}
