//! Background-job bookkeeping for synchronisation runs.
//!
//! A run is dispatched onto the tokio runtime at most once at a time: the
//! registry holds the names of runs with a live task, and enqueueing is
//! refused while the name is still registered.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::{Duration, Instant};

/// Failures surfaced by the sync executors. Refused preconditions are
/// distinct from internal failures so handlers can answer with a
/// service-unavailable status instead of a blanket 500.
#[derive(Debug, thiserror::Error)]
pub enum SyncJobError {
    #[error("Sync run not found")]
    RunNotFound,
    #[error("The scheduler is inactive, the synchronisation cannot start.")]
    SchedulerInactive,
    #[error("PythaCore is not running, the synchronisation cannot start.")]
    BackendOffline,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Names of runs that currently have a dispatched task
pub struct JobRegistry {
    jobs: Mutex<HashSet<String>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(HashSet::new()),
        }
    }

    /// Register a run name. Returns false when a task for this run is
    /// already live, in which case the caller must not dispatch another.
    pub fn try_register(&self, name: &str) -> bool {
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        jobs.insert(name.to_string())
    }

    pub fn release(&self, name: &str) {
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        jobs.remove(name);
    }

    pub fn is_registered(&self, name: &str) -> bool {
        let jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        jobs.contains(name)
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the background scheduler is accepting work. An inactive
/// scheduler refuses new runs, except in test mode where runs execute
/// inline and no scheduler is involved.
pub struct SchedulerState {
    active: AtomicBool,
    in_test: bool,
}

impl SchedulerState {
    pub fn new(active: bool) -> Self {
        Self {
            active: AtomicBool::new(active),
            in_test: false,
        }
    }

    pub fn for_tests() -> Self {
        Self {
            active: AtomicBool::new(false),
            in_test: true,
        }
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Relaxed);
    }

    pub fn allows_dispatch(&self) -> bool {
        self.in_test || self.active.load(Ordering::Relaxed)
    }
}

/// Liveness of the external synchronisation client
pub trait BackendHealth: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Liveness flag fed by the heartbeat endpoint. Goes stale when the
/// external client has not pinged within the time-to-live.
pub struct CachedLiveness {
    last_seen: RwLock<Option<Instant>>,
    ttl: Duration,
}

impl CachedLiveness {
    pub fn new(ttl: Duration) -> Self {
        Self {
            last_seen: RwLock::new(None),
            ttl,
        }
    }

    pub fn mark_online(&self) {
        let mut last_seen = self.last_seen.write().unwrap_or_else(|e| e.into_inner());
        *last_seen = Some(Instant::now());
    }
}

impl BackendHealth for CachedLiveness {
    fn is_online(&self) -> bool {
        let last_seen = self.last_seen.read().unwrap_or_else(|e| e.into_inner());
        last_seen.map(|t| t.elapsed() < self.ttl).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_refuses_second_registration() {
        let registry = JobRegistry::new();
        assert!(registry.try_register("Synchronisation on 01/01/2026 at 09:00"));
        assert!(!registry.try_register("Synchronisation on 01/01/2026 at 09:00"));
        registry.release("Synchronisation on 01/01/2026 at 09:00");
        assert!(registry.try_register("Synchronisation on 01/01/2026 at 09:00"));
    }

    #[test]
    fn inactive_scheduler_blocks_unless_in_test() {
        let scheduler = SchedulerState::new(false);
        assert!(!scheduler.allows_dispatch());
        scheduler.set_active(true);
        assert!(scheduler.allows_dispatch());
        assert!(SchedulerState::for_tests().allows_dispatch());
    }

    #[test]
    fn liveness_starts_offline_and_expires() {
        let liveness = CachedLiveness::new(Duration::from_secs(60));
        assert!(!liveness.is_online());
        liveness.mark_online();
        assert!(liveness.is_online());

        let stale = CachedLiveness::new(Duration::ZERO);
        stale.mark_online();
        assert!(!stale.is_online());
    }
}
