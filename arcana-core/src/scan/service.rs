use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use arcana_model::{
    ProgressUpdate, ScanPhase, ScanProgress, ScanResult, ScanTaskId,
    ScanTicket,
};
use tracing::{error, info, warn};

use super::capability::{PlatformScanner, ProgressSink};
use super::events::ScanEventBus;
use super::ingest::Ingestor;
use super::registry::{CancelToken, ScanRegistry};
use crate::{Catalog, CatalogError, Result};

/// Scan orchestration facade: owns the scanner map, the task registry, and
/// the event bus, and spawns one detached task per accepted scan.
///
/// Nothing that happens inside a running scan ever propagates to the caller
/// of [`request_scan`](Self::request_scan) /
/// [`cancel_scan`](Self::cancel_scan) / [`active_scans`](Self::active_scans);
/// scan-time failures travel exclusively on the event bus.
pub struct ScanService {
    catalog: Catalog,
    registry: Arc<ScanRegistry>,
    events: Arc<ScanEventBus>,
    scanners: HashMap<String, Arc<dyn PlatformScanner>>,
}

impl std::fmt::Debug for ScanService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanService")
            .field("registry", &self.registry)
            .field("events", &self.events)
            .field("scanners", &self.scanners.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ScanService {
    pub fn new(catalog: Catalog, events: Arc<ScanEventBus>) -> Self {
        Self {
            catalog,
            registry: Arc::new(ScanRegistry::new()),
            events,
            scanners: HashMap::new(),
        }
    }

    /// Register a platform integration under its exact name.
    pub fn register_scanner(&mut self, scanner: Arc<dyn PlatformScanner>) {
        self.scanners.insert(scanner.name().to_string(), scanner);
    }

    pub fn events(&self) -> &Arc<ScanEventBus> {
        &self.events
    }

    /// Accept a scan for the named platform and return its task id
    /// immediately; the scan itself runs on a detached task.
    ///
    /// Fails synchronously (and creates no task) only when no scanner is
    /// registered for the name. Overlapping scans for the same platform are
    /// allowed by policy; callers wanting de-duplication check
    /// [`is_scanning`](Self::is_scanning) first.
    pub fn request_scan(&self, platform: &str) -> Result<ScanTaskId> {
        let scanner = self
            .scanners
            .get(platform)
            .cloned()
            .ok_or_else(|| {
                CatalogError::NoScannerRegistered(platform.to_string())
            })?;

        let (task_id, token) = self.registry.register(platform);
        info!(%task_id, platform, "scan accepted");

        let run = ScanRun {
            catalog: self.catalog.clone(),
            registry: Arc::clone(&self.registry),
            events: Arc::clone(&self.events),
            scanner,
            task_id,
            platform: platform.to_string(),
            token,
        };
        tokio::spawn(run.execute());

        Ok(task_id)
    }

    /// Advisory cancel. True if the id was live; the running routine notices
    /// at its next checkpoint and may already be past the last one.
    pub fn cancel_scan(&self, id: ScanTaskId) -> bool {
        let cancelled = self.registry.cancel(id);
        if cancelled {
            info!(task_id = %id, "scan cancellation requested");
        }
        cancelled
    }

    pub fn active_scans(&self) -> Vec<ScanTicket> {
        self.registry.snapshot()
    }

    pub fn is_scanning(&self, platform: &str) -> bool {
        self.registry.is_scanning(platform)
    }
}

/// One scan execution: pending → prerequisite-check → running →
/// {completing | cancelling | failing} → terminal. Terminal always removes
/// the registry entry, whichever path got there.
struct ScanRun {
    catalog: Catalog,
    registry: Arc<ScanRegistry>,
    events: Arc<ScanEventBus>,
    scanner: Arc<dyn PlatformScanner>,
    task_id: ScanTaskId,
    platform: String,
    token: CancelToken,
}

impl ScanRun {
    async fn execute(self) {
        self.run().await;
        self.registry.remove(self.task_id);
    }

    async fn run(&self) {
        match self.scanner.can_run().await {
            Ok(true) => {}
            Ok(false) => {
                warn!(task_id = %self.task_id, platform = %self.platform,
                    "scanner prerequisites not met");
                self.events.emit_progress(ScanProgress::failed(
                    self.task_id,
                    &self.platform,
                    "Scanner prerequisites not met",
                ));
                return;
            }
            Err(err) => {
                error!(task_id = %self.task_id, platform = %self.platform,
                    error = %err, "scanner prerequisite check failed");
                self.events.emit_progress(ScanProgress::failed(
                    self.task_id,
                    &self.platform,
                    err.to_string(),
                ));
                return;
            }
        }

        self.events.emit_progress(ScanProgress::update(
            self.task_id,
            &self.platform,
            ProgressUpdate::phase(ScanPhase::Started)
                .with_message("Scan started"),
        ));

        let started = Instant::now();
        let sink = ProgressSink::new(
            self.task_id,
            self.platform.clone(),
            self.token.clone(),
            Arc::clone(&self.events),
        );

        let candidates = match self.scanner.scan(&sink).await {
            Ok(candidates) => candidates,
            Err(err) => {
                error!(task_id = %self.task_id, platform = %self.platform,
                    error = %err, "scan failed");
                self.events.emit_progress(ScanProgress::failed(
                    self.task_id,
                    &self.platform,
                    err.to_string(),
                ));
                return;
            }
        };

        // Cancellation observed before ingestion discards the whole batch;
        // nothing is partially ingested.
        if self.token.is_cancelled() {
            info!(task_id = %self.task_id, platform = %self.platform,
                "scan cancelled before ingestion");
            self.events.emit_progress(ScanProgress::cancelled(
                self.task_id,
                &self.platform,
            ));
            return;
        }

        let summary =
            Ingestor::new(self.catalog.clone()).ingest(&candidates).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        info!(task_id = %self.task_id, platform = %self.platform,
            added = summary.added, skipped = summary.skipped,
            duration_ms, "scan complete");

        self.events.emit_progress(ScanProgress::done(
            self.task_id,
            &self.platform,
            format!("Added {} games", summary.added),
        ));
        self.events.emit_complete(ScanResult {
            task_id: self.task_id,
            platform: self.platform.clone(),
            added: summary.added,
            candidates,
            duration_ms,
        });
    }
}
