use serde::{Deserialize, Serialize};

/// Returned by the enqueue endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueResponse {
    /// `false` when a job with this run's name is already registered
    pub queued: bool,
}
