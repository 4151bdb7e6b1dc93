use crate::domain::a101_sync_run::log::{DocumentResult, ErrorCode, ErrorData};
use serde::{Deserialize, Serialize};

/// Body of the success callback: the external system committed the data,
/// possibly with per-document warnings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessCallback {
    pub docs: Vec<DocumentResult>,
}

/// Body of the abort callback: fatal failure, nothing was committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbortCallback {
    pub docs: Vec<DocumentResult>,
    pub reason: AbortReason,
}

/// Why the external system gave up on the run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbortReason {
    #[serde(rename = "type")]
    pub kind: AbortKind,

    /// Free-text explanation, when the external system has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Coded error, rendered via the fixed template table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_data: Option<ErrorData>,
}

/// Severity class of an abort reason. A fatal warning aborts the run but
/// renders as the softer message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortKind {
    FatalWarning,
    #[serde(other)]
    FatalError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abort_reason_parses_wire_shape() {
        let reason: AbortReason = serde_json::from_str(
            r#"{"type": "fatal_warning", "message": "Import file locked."}"#,
        )
        .unwrap();
        assert_eq!(reason.kind, AbortKind::FatalWarning);
        assert_eq!(reason.message.as_deref(), Some("Import file locked."));
    }

    #[test]
    fn unknown_reason_kind_falls_back_to_fatal_error() {
        let reason: AbortReason = serde_json::from_str(
            r#"{"type": "something_new", "error_code": "INV_STATUS",
                "error_data": {"doctype": "Sales Invoice", "docname": "SI-1", "status": "Draft"}}"#,
        )
        .unwrap();
        assert_eq!(reason.kind, AbortKind::FatalError);
        assert_eq!(reason.error_code, Some(ErrorCode::InvStatus));
    }
}
