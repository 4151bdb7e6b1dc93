pub mod aggregate;
pub mod log;

pub use aggregate::{SyncRun, SyncRunDto, SyncRunId, SyncStatus};
pub use log::{DocStatus, DocumentResult, ErrorCode, ErrorData, WarningCode, WarningData};
