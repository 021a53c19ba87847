use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::ScanTaskId;

/// Point-in-time view of one live scan, as reported by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTicket {
    pub id: ScanTaskId,
    pub platform: String,
    pub started_at: DateTime<Utc>,
}

/// Coarse phase labels attached to progress events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanPhase {
    Started,
    Fetching,
    Finalizing,
    Done,
    Cancelled,
}

/// Immutable progress snapshot broadcast at each step of a scan.
///
/// Fire-and-forget telemetry: consumers must never treat these as the source
/// of truth for task existence (the registry is authoritative). Terminal
/// events carry `done = true` and, on failure, a non-empty `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProgress {
    pub task_id: ScanTaskId,
    pub platform: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<ScanPhase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanProgress {
    /// Non-terminal snapshot built from a scanner's partial update.
    pub fn update(
        task_id: ScanTaskId,
        platform: impl Into<String>,
        update: ProgressUpdate,
    ) -> Self {
        Self {
            task_id,
            platform: platform.into(),
            phase: update.phase,
            current: update.current,
            total: update.total,
            message: update.message,
            done: false,
            error: None,
        }
    }

    /// Terminal snapshot carrying an error message.
    pub fn failed(
        task_id: ScanTaskId,
        platform: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            task_id,
            platform: platform.into(),
            phase: None,
            current: None,
            total: None,
            message: None,
            done: true,
            error: Some(error.into()),
        }
    }

    /// Terminal snapshot for an observed cancellation.
    pub fn cancelled(task_id: ScanTaskId, platform: impl Into<String>) -> Self {
        Self {
            task_id,
            platform: platform.into(),
            phase: Some(ScanPhase::Cancelled),
            current: None,
            total: None,
            message: Some("Scan cancelled".to_string()),
            done: true,
            error: None,
        }
    }

    /// Terminal snapshot for a successful scan.
    pub fn done(
        task_id: ScanTaskId,
        platform: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            task_id,
            platform: platform.into(),
            phase: Some(ScanPhase::Done),
            current: None,
            total: None,
            message: Some(message.into()),
            done: true,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.done
    }
}

/// Partial progress reported by a scanner; the engine fills in task identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub phase: Option<ScanPhase>,
    pub current: Option<usize>,
    pub total: Option<usize>,
    pub message: Option<String>,
}

impl ProgressUpdate {
    pub fn phase(phase: ScanPhase) -> Self {
        Self {
            phase: Some(phase),
            ..Default::default()
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_counts(mut self, current: usize, total: usize) -> Self {
        self.current = Some(current);
        self.total = Some(total);
        self
    }
}

/// An unvalidated game record proposed by a scanner. Never stored directly;
/// the ingestion merger translates it into a catalog game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedCandidate {
    pub title: String,
    pub platform: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
}

impl ScannedCandidate {
    pub fn new(title: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            platform: platform.into(),
            genre: None,
            tags: Vec::new(),
            release_date: None,
        }
    }
}

/// Final outcome of a completed (not cancelled, not failed) scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub task_id: ScanTaskId,
    pub platform: String,
    /// Games actually inserted; skipped duplicates and per-item failures
    /// only show up as the difference against `candidates.len()`.
    pub added: usize,
    pub candidates: Vec<ScannedCandidate>,
    pub duration_ms: u64,
}

/// Envelope for relaying either stream over a single transport (SSE, logs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanEvent {
    Progress(ScanProgress),
    Complete(ScanResult),
}
