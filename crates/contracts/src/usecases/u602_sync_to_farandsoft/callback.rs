use crate::domain::a101_sync_run::log::DocumentResult;
use serde::{Deserialize, Serialize};

/// Final outcome reported by the Farandsoft pipeline: separate error and
/// success lists plus an optional run-level error message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCallback {
    #[serde(default)]
    pub errors: Vec<DocumentResult>,
    #[serde(default)]
    pub successes: Vec<DocumentResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Mid-run error appended to the run record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppendErrorRequest {
    pub error_message: String,
}
