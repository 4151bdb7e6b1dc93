use serde::{Deserialize, Serialize};

/// Counters read back from the progress store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressSnapshot {
    pub sync_doc_name: String,
    pub current: u32,
    pub total: u32,
}
