use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arcana_model::{ScanTaskId, ScanTicket};
use chrono::{DateTime, Utc};

/// Advisory cancellation flag shared between the registry and one running
/// scan routine. Cancellation is cooperative: the routine observes the flag
/// at its checkpoints (progress callbacks and the post-scan boundary) and is
/// never preempted mid-I/O.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
struct TaskEntry {
    platform: String,
    started_at: DateTime<Utc>,
    token: CancelToken,
}

/// Single source of truth for which scans are live.
///
/// The map is the only shared mutable state in the engine; every mutation is
/// serialized behind the mutex, and the lock is never held across scan work.
/// Task ids are opaque, unique, and never reused.
#[derive(Debug, Default)]
pub struct ScanRegistry {
    tasks: Mutex<HashMap<ScanTaskId, TaskEntry>>,
}

impl ScanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ScanTaskId, TaskEntry>> {
        // A panic while holding this lock leaves the map structurally intact,
        // so poisoning is recoverable.
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a new live task and hand back its identity and cancel token.
    ///
    /// Always allocates: overlapping scans for the same platform are allowed
    /// by policy, and callers wanting de-duplication check
    /// [`is_scanning`](Self::is_scanning) or [`snapshot`](Self::snapshot)
    /// first.
    pub fn register(&self, platform: &str) -> (ScanTaskId, CancelToken) {
        let id = ScanTaskId::new();
        let token = CancelToken::new();
        let entry = TaskEntry {
            platform: platform.to_string(),
            started_at: Utc::now(),
            token: token.clone(),
        };
        self.lock().insert(id, entry);
        (id, token)
    }

    /// Flag the task cancelled and drop it from the registry immediately.
    /// Returns false for unknown (or already finished) ids.
    pub fn cancel(&self, id: ScanTaskId) -> bool {
        match self.lock().remove(&id) {
            Some(entry) => {
                entry.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Terminal cleanup, called by the scan routine on every exit path.
    /// A no-op when `cancel` already removed the entry.
    pub fn remove(&self, id: ScanTaskId) {
        self.lock().remove(&id);
    }

    /// Point-in-time view of live tasks, oldest first.
    pub fn snapshot(&self) -> Vec<ScanTicket> {
        let mut tickets: Vec<ScanTicket> = self
            .lock()
            .iter()
            .map(|(id, entry)| ScanTicket {
                id: *id,
                platform: entry.platform.clone(),
                started_at: entry.started_at,
            })
            .collect();
        tickets.sort_by(|a, b| {
            a.started_at.cmp(&b.started_at).then(a.id.cmp(&b.id))
        });
        tickets
    }

    pub fn is_scanning(&self, platform: &str) -> bool {
        self.lock().values().any(|entry| entry.platform == platform)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_snapshot() {
        let registry = ScanRegistry::new();
        let (a, _) = registry.register("Steam");
        let (b, _) = registry.register("Epic");

        let tickets = registry.snapshot();
        assert_eq!(tickets.len(), 2);
        assert!(tickets.iter().any(|t| t.id == a && t.platform == "Steam"));
        assert!(tickets.iter().any(|t| t.id == b && t.platform == "Epic"));
        assert!(registry.is_scanning("Steam"));
        assert!(!registry.is_scanning("GOG"));
    }

    #[test]
    fn cancel_sets_token_and_removes_entry() {
        let registry = ScanRegistry::new();
        let (id, token) = registry.register("Steam");

        assert!(!token.is_cancelled());
        assert!(registry.cancel(id));
        assert!(token.is_cancelled());
        assert!(registry.is_empty());

        // Second cancel and cancel of unknown ids report false, never fail.
        assert!(!registry.cancel(id));
        assert!(!registry.cancel(ScanTaskId::new()));
    }

    #[test]
    fn remove_after_cancel_is_a_noop() {
        let registry = ScanRegistry::new();
        let (id, _) = registry.register("Steam");
        assert!(registry.cancel(id));
        registry.remove(id);
        assert!(registry.is_empty());
    }

    #[test]
    fn same_platform_may_register_twice() {
        let registry = ScanRegistry::new();
        let (a, _) = registry.register("Steam");
        let (b, _) = registry.register("Steam");
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }
}
