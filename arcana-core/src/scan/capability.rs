use std::sync::Arc;

use arcana_model::{ProgressUpdate, ScanProgress, ScanTaskId, ScannedCandidate};
use async_trait::async_trait;

use super::events::ScanEventBus;
use super::registry::CancelToken;
use crate::Result;

/// Handle a scanner uses to report incremental progress.
///
/// Carries the task identity and the cancellation token, so the dropped-event
/// semantics live in one place: once the task is cancelled, `report` becomes
/// a no-op and nothing further is delivered to observers. Scanners that want
/// to stop early can poll [`is_cancelled`](Self::is_cancelled) between items,
/// but are never forcibly interrupted.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    task_id: ScanTaskId,
    platform: String,
    token: CancelToken,
    events: Arc<ScanEventBus>,
}

impl ProgressSink {
    pub(crate) fn new(
        task_id: ScanTaskId,
        platform: String,
        token: CancelToken,
        events: Arc<ScanEventBus>,
    ) -> Self {
        Self {
            task_id,
            platform,
            token,
            events,
        }
    }

    pub fn report(&self, update: ProgressUpdate) {
        if self.token.is_cancelled() {
            return;
        }
        self.events.emit_progress(ScanProgress::update(
            self.task_id,
            self.platform.clone(),
            update,
        ));
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Per-platform unit of work a storefront integration implements.
///
/// The engine imposes no timeout: a scan that never reports and never
/// returns occupies its registry slot until externally cancelled.
#[async_trait]
pub trait PlatformScanner: Send + Sync {
    /// Exact platform name this scanner serves; used as the lookup key.
    fn name(&self) -> &str;

    /// Prerequisite check, may itself do I/O (stored credentials, installed
    /// client detection). Returning false blocks the scan before any work.
    async fn can_run(&self) -> Result<bool>;

    /// The long-running scan. Reports through `progress` any number of times
    /// before returning the candidate list (or failing).
    async fn scan(
        &self,
        progress: &ProgressSink,
    ) -> Result<Vec<ScannedCandidate>>;
}
