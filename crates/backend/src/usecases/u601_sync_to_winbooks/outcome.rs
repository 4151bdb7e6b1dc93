//! Final classification of a Winbooks run from its callback payload.
//!
//! Classification is pure; the appliers persist the outcome field by field
//! and publish a refresh event.

use crate::domain::{a101_sync_run, a102_sync_stamp};
use crate::shared::realtime::RealtimePublisher;
use chrono::Utc;
use contracts::domain::a101_sync_run::aggregate::{SyncRun, SyncStatus};
use contracts::domain::a101_sync_run::log::{error_message, DocStatus, DocumentResult};
use contracts::shared::events::{Pipeline, RefreshPayload};
use contracts::usecases::u601_sync_to_winbooks::{AbortCallback, AbortKind, SuccessCallback};

/// Range summary shown for entity types an aborted run never reached
pub const NOTHING_PLACEHOLDER: &str = "Nothing";

const WARNING_BANNER: &str = "Winbooks gave at least one warning but don't worry, \
it was taken care of automatically (see below for details).";
const ABORT_WARNING_BANNER: &str = "Sorry, there is at least one problem that could \
not be solved automatically (see below for details).";
const ABORT_ERROR_BANNER: &str = "Sorry, there is at least one fatal error.";
const NOT_IMPORTED: &str = "The data was NOT imported into Winbooks.";

pub struct SuccessOutcome {
    pub docs: Vec<DocumentResult>,
    pub warning_message: Option<String>,
    pub headline: Option<String>,
}

/// Classify a committed run: docs without a status default to Success,
/// warning docs get their message rendered, and the run-level warning
/// banner is appended to whatever warning text the run already carries.
/// A banner left over from an earlier delivery of the same callback is
/// dropped first, so re-delivery settles on the same text.
pub fn classify_success(
    mut docs: Vec<DocumentResult>,
    existing_warning: Option<String>,
) -> SuccessOutcome {
    let mut warnings_present = false;
    for doc in &mut docs {
        match doc.status {
            None => doc.status = Some(DocStatus::Success),
            Some(DocStatus::Warning) => {
                warnings_present = true;
                doc.message = doc.rendered_warning_message();
            }
            _ => {}
        }
    }

    let warning_message = if warnings_present {
        let prior = existing_warning
            .as_deref()
            .map(strip_warning_banner)
            .filter(|text| !text.is_empty());
        Some(match prior {
            Some(prev) => format!("{}\n{}", prev, WARNING_BANNER),
            None => WARNING_BANNER.to_string(),
        })
    } else {
        None
    };

    let headline = if docs.is_empty() {
        Some("Nothing to synchronise.".to_string())
    } else {
        None
    };

    SuccessOutcome {
        docs,
        warning_message,
        headline,
    }
}

/// The banner is a single line; drop it wherever a previous delivery put it
fn strip_warning_banner(text: &str) -> String {
    text.lines()
        .filter(|line| *line != WARNING_BANNER)
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct AbortOutcome {
    pub docs: Vec<DocumentResult>,
    pub warning_message: Option<String>,
    pub error_message: Option<String>,
}

/// Classify an aborted run. Docs without a status default to Error; docs
/// that did carry warnings still get their message rendered. Which
/// run-level field receives the abort text depends on the reason kind:
/// a fatal warning lands in warning_message even though the run status
/// is Error, so the softer banner is shown.
pub fn classify_abort(
    mut docs: Vec<DocumentResult>,
    callback: &AbortCallback,
) -> AbortOutcome {
    for doc in &mut docs {
        if doc.status.is_none() {
            doc.status = Some(DocStatus::Error);
        } else if !doc.warning_codes.is_empty() {
            doc.message = doc.rendered_warning_message();
        }
    }

    // Only a fatal error falls back to the coded template; a fatal
    // warning carries its text in the message alone.
    let reason = &callback.reason;
    let detail = match reason.kind {
        AbortKind::FatalWarning => reason.message.clone(),
        AbortKind::FatalError => reason.message.clone().or_else(|| {
            reason
                .error_code
                .map(|code| error_message(code, &reason.error_data.clone().unwrap_or_default()))
        }),
    };

    let banner = match reason.kind {
        AbortKind::FatalWarning => ABORT_WARNING_BANNER,
        AbortKind::FatalError => ABORT_ERROR_BANNER,
    };
    let mut fragments = vec![banner.to_string()];
    if let Some(detail) = detail {
        fragments.push(detail);
    }
    fragments.push(NOT_IMPORTED.to_string());
    let text = fragments.join("\n\n");

    let (warning_message, error_message) = match reason.kind {
        AbortKind::FatalWarning => (Some(text), None),
        AbortKind::FatalError => (None, Some(text)),
    };

    AbortOutcome {
        docs,
        warning_message,
        error_message,
    }
}

/// Persist a success outcome: stamp every document with the run's sync
/// datetime, then write status, messages and log.
pub async fn apply_success(
    run: &SyncRun,
    callback: SuccessCallback,
    publisher: &RealtimePublisher,
) -> anyhow::Result<()> {
    let id = run.base.id.value();
    a101_sync_run::repository::set_status(id, SyncStatus::Success).await?;

    let sync_date = run.sync_datetime.unwrap_or_else(Utc::now);
    a102_sync_stamp::service::stamp_documents(&callback.docs, sync_date).await?;

    let outcome = classify_success(callback.docs, run.warning_message.clone());
    if outcome.warning_message.is_some() {
        a101_sync_run::repository::set_warning_message(id, outcome.warning_message).await?;
    }
    if outcome.headline.is_some() {
        a101_sync_run::repository::set_headline(id, outcome.headline).await?;
    }
    a101_sync_run::repository::set_sync_log(id, &outcome.docs).await?;

    tracing::info!(name = %run.base.name, docs = outcome.docs.len(), "winbooks run succeeded");
    publisher.publish(Pipeline::Winbooks.refresh_event(RefreshPayload {
        sync_doc_name: run.base.name.clone(),
    }));
    Ok(())
}

/// Persist an abort outcome: nothing was committed on the accounting side,
/// so no documents are stamped and the range summaries collapse to a
/// placeholder.
pub async fn apply_abort(
    run: &SyncRun,
    callback: AbortCallback,
    publisher: &RealtimePublisher,
) -> anyhow::Result<()> {
    let id = run.base.id.value();
    a101_sync_run::repository::set_status(id, SyncStatus::Error).await?;
    a101_sync_run::repository::set_ranges(id, NOTHING_PLACEHOLDER).await?;

    let outcome = classify_abort(callback.docs.clone(), &callback);
    if outcome.warning_message.is_some() {
        a101_sync_run::repository::set_warning_message(id, outcome.warning_message).await?;
    }
    if outcome.error_message.is_some() {
        a101_sync_run::repository::set_error_message(id, outcome.error_message).await?;
    }
    a101_sync_run::repository::set_sync_log(id, &outcome.docs).await?;

    tracing::warn!(name = %run.base.name, "winbooks run aborted");
    publisher.publish(Pipeline::Winbooks.refresh_event(RefreshPayload {
        sync_doc_name: run.base.name.clone(),
    }));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a101_sync_run::log::{ErrorCode, ErrorData, WarningCode, WarningData};
    use contracts::usecases::u601_sync_to_winbooks::AbortReason;

    fn warning_doc() -> DocumentResult {
        let mut doc = DocumentResult::new("Sales Invoice", "SI-0001");
        doc.status = Some(DocStatus::Warning);
        doc.warning_codes = vec![WarningCode::AccMod];
        doc.warning_data = Some(WarningData {
            doctype: Some("Sales Invoice".into()),
            docname: Some("SI-0001".into()),
            ..Default::default()
        });
        doc
    }

    #[test]
    fn statusless_docs_default_to_success() {
        let outcome = classify_success(vec![DocumentResult::new("Customer", "CUST-1")], None);
        assert_eq!(outcome.docs[0].status, Some(DocStatus::Success));
        assert!(outcome.warning_message.is_none());
        assert!(outcome.headline.is_none());
    }

    #[test]
    fn warnings_render_messages_and_raise_the_banner() {
        let outcome = classify_success(vec![warning_doc()], None);
        assert!(outcome.docs[0]
            .message
            .as_deref()
            .unwrap()
            .contains("updated in Winbooks"));
        assert!(outcome
            .warning_message
            .as_deref()
            .unwrap()
            .contains("taken care of automatically"));
    }

    #[test]
    fn banner_is_appended_to_existing_warning_text() {
        let outcome = classify_success(vec![warning_doc()], Some("earlier warning".into()));
        let message = outcome.warning_message.unwrap();
        assert!(message.starts_with("earlier warning\n"));
        assert!(message.contains("taken care of automatically"));
    }

    #[test]
    fn redelivered_success_settles_on_one_banner() {
        let first = classify_success(vec![warning_doc()], Some("earlier warning".into()));
        let second = classify_success(vec![warning_doc()], first.warning_message.clone());
        assert_eq!(first.warning_message, second.warning_message);
        assert_eq!(
            second
                .warning_message
                .as_deref()
                .unwrap()
                .matches("taken care of automatically")
                .count(),
            1
        );
    }

    #[test]
    fn empty_success_gets_the_nothing_headline() {
        let outcome = classify_success(Vec::new(), None);
        assert_eq!(outcome.headline.as_deref(), Some("Nothing to synchronise."));
    }

    #[test]
    fn fatal_warning_lands_in_warning_message() {
        let callback = AbortCallback {
            docs: vec![DocumentResult::new("Sales Invoice", "SI-0001")],
            reason: AbortReason {
                kind: AbortKind::FatalWarning,
                message: Some("Import file is locked.".into()),
                error_code: None,
                error_data: None,
            },
        };
        let outcome = classify_abort(callback.docs.clone(), &callback);
        assert_eq!(outcome.docs[0].status, Some(DocStatus::Error));
        assert!(outcome.error_message.is_none());
        let warning = outcome.warning_message.unwrap();
        assert!(warning.contains("could not be solved automatically"));
        assert!(warning.contains("Import file is locked."));
        assert!(warning.ends_with(NOT_IMPORTED));
    }

    #[test]
    fn fatal_warning_ignores_the_error_code() {
        let callback = AbortCallback {
            docs: Vec::new(),
            reason: AbortReason {
                kind: AbortKind::FatalWarning,
                message: None,
                error_code: Some(ErrorCode::InvStatus),
                error_data: Some(ErrorData {
                    doctype: "Sales Invoice".into(),
                    docname: "SI-0001".into(),
                    status: "Draft".into(),
                }),
            },
        };
        let outcome = classify_abort(Vec::new(), &callback);
        let warning = outcome.warning_message.unwrap();
        assert!(!warning.contains("Cannot synchronise"));
        assert_eq!(
            warning,
            format!("{}\n\n{}", ABORT_WARNING_BANNER, NOT_IMPORTED)
        );
    }

    #[test]
    fn fatal_error_renders_the_coded_template() {
        let callback = AbortCallback {
            docs: Vec::new(),
            reason: AbortReason {
                kind: AbortKind::FatalError,
                message: None,
                error_code: Some(ErrorCode::InvStatus),
                error_data: Some(ErrorData {
                    doctype: "Sales Invoice".into(),
                    docname: "SI-0001".into(),
                    status: "Draft".into(),
                }),
            },
        };
        let outcome = classify_abort(Vec::new(), &callback);
        assert!(outcome.warning_message.is_none());
        let error = outcome.error_message.unwrap();
        assert!(error.starts_with(ABORT_ERROR_BANNER));
        assert!(error.contains("Cannot synchronise Sales Invoice SI-0001"));
    }

    #[test]
    fn aborted_warning_docs_keep_their_rendered_message() {
        let callback = AbortCallback {
            docs: vec![warning_doc()],
            reason: AbortReason {
                kind: AbortKind::FatalError,
                message: Some("boom".into()),
                error_code: None,
                error_data: None,
            },
        };
        let outcome = classify_abort(callback.docs.clone(), &callback);
        assert_eq!(outcome.docs[0].status, Some(DocStatus::Warning));
        assert!(outcome.docs[0].message.is_some());
    }
}
