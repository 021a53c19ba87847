use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, Semaphore};

use arcana_core::{
    Catalog, CatalogError, Ingestor, PlatformScanner, ProgressSink, Result,
    ScanEventBus, ScanService,
};
use arcana_model::{
    NewGame, ProgressUpdate, ScanPhase, ScanProgress, ScanResult,
    ScanTaskId, ScannedCandidate,
};

/// Two-step handshake used to park a scanner mid-scan so tests can race
/// cancellation against it deterministically. Semaphores rather than
/// notifies so permits accumulate when both sides race.
struct Gate {
    entered: Semaphore,
    release: Semaphore,
}

impl Default for Gate {
    fn default() -> Self {
        Self {
            entered: Semaphore::new(0),
            release: Semaphore::new(0),
        }
    }
}

impl Gate {
    async fn wait_entered(&self) {
        self.entered.acquire().await.expect("gate closed").forget();
    }

    fn open(&self) {
        self.release.add_permits(1);
    }
}

struct MockScanner {
    name: &'static str,
    runnable: bool,
    candidates: Vec<ScannedCandidate>,
    gate: Option<Arc<Gate>>,
}

impl MockScanner {
    fn yielding(name: &'static str, candidates: Vec<ScannedCandidate>) -> Self {
        Self {
            name,
            runnable: true,
            candidates,
            gate: None,
        }
    }

    fn blocked(name: &'static str) -> Self {
        Self {
            name,
            runnable: false,
            candidates: Vec::new(),
            gate: None,
        }
    }

    fn gated(
        name: &'static str,
        candidates: Vec<ScannedCandidate>,
        gate: Arc<Gate>,
    ) -> Self {
        Self {
            name,
            runnable: true,
            candidates,
            gate: Some(gate),
        }
    }
}

#[async_trait]
impl PlatformScanner for MockScanner {
    fn name(&self) -> &str {
        self.name
    }

    async fn can_run(&self) -> Result<bool> {
        Ok(self.runnable)
    }

    async fn scan(
        &self,
        progress: &ProgressSink,
    ) -> Result<Vec<ScannedCandidate>> {
        let total = self.candidates.len();
        for (index, candidate) in self.candidates.iter().enumerate() {
            progress.report(
                ProgressUpdate::phase(ScanPhase::Fetching)
                    .with_counts(index + 1, total)
                    .with_message(format!("Fetching {}", candidate.title)),
            );
        }
        if let Some(gate) = &self.gate {
            gate.entered.add_permits(1);
            gate.release.acquire().await.expect("gate closed").forget();
        }
        Ok(self.candidates.clone())
    }
}

struct FailingScanner;

#[async_trait]
impl PlatformScanner for FailingScanner {
    fn name(&self) -> &str {
        "Steam"
    }

    async fn can_run(&self) -> Result<bool> {
        Ok(true)
    }

    async fn scan(&self, _: &ProgressSink) -> Result<Vec<ScannedCandidate>> {
        Err(CatalogError::Internal("library listing timed out".into()))
    }
}

async fn service_with(
    scanner: impl PlatformScanner + 'static,
) -> (ScanService, Catalog) {
    let catalog = Catalog::in_memory().await.expect("catalog");
    let events = Arc::new(ScanEventBus::new(64));
    let mut service = ScanService::new(catalog.clone(), events);
    service.register_scanner(Arc::new(scanner));
    (service, catalog)
}

/// Wait (bounded) for the registry to drain, i.e. the routine hit terminal.
async fn wait_for_idle(service: &ScanService) {
    for _ in 0..200 {
        if service.active_scans().is_empty() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("scan registry never drained");
}

async fn next_terminal(
    rx: &mut broadcast::Receiver<ScanProgress>,
) -> ScanProgress {
    loop {
        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for progress")
            .expect("progress channel closed");
        if event.is_terminal() {
            return event;
        }
    }
}

async fn next_complete(
    rx: &mut broadcast::Receiver<ScanResult>,
) -> ScanResult {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for completion")
        .expect("complete channel closed")
}

fn steam_candidates() -> Vec<ScannedCandidate> {
    vec![
        ScannedCandidate::new("Half-Life", "Steam"),
        ScannedCandidate::new("Portal", "Steam"),
    ]
}

#[tokio::test]
async fn unregistered_platform_fails_fast_without_a_task() {
    let (service, _catalog) =
        service_with(MockScanner::yielding("Steam", Vec::new())).await;

    let err = service.request_scan("GOG").expect_err("must fail");
    assert!(matches!(err, CatalogError::NoScannerRegistered(ref p) if p == "GOG"));
    assert!(service.active_scans().is_empty());
}

#[tokio::test]
async fn failed_prerequisites_emit_one_terminal_error() {
    let (service, catalog) = service_with(MockScanner::blocked("Steam")).await;
    let mut progress = service.events().subscribe_progress();
    let mut complete = service.events().subscribe_complete();

    service.request_scan("Steam").expect("accepted");

    let terminal = next_terminal(&mut progress).await;
    assert!(terminal.done);
    assert!(terminal.error.as_deref().is_some_and(|e| !e.is_empty()));

    wait_for_idle(&service).await;
    assert!(matches!(
        complete.try_recv(),
        Err(broadcast::error::TryRecvError::Empty)
    ));
    assert_eq!(catalog.games().count().await.expect("count"), 0);
}

#[tokio::test]
async fn scanner_failure_is_contained_in_the_event_stream() {
    let (service, _catalog) = service_with(FailingScanner).await;
    let mut progress = service.events().subscribe_progress();

    service.request_scan("Steam").expect("accepted");

    let terminal = next_terminal(&mut progress).await;
    assert!(terminal
        .error
        .as_deref()
        .is_some_and(|e| e.contains("library listing timed out")));
    wait_for_idle(&service).await;
}

#[tokio::test]
async fn completed_scan_reports_added_against_full_candidate_list() {
    // Three candidates, one colliding with a pre-existing row and one
    // in-batch duplicate: added must count only genuine inserts while the
    // result still carries every original candidate.
    let candidates = vec![
        ScannedCandidate::new("Half-Life", "Steam"),
        ScannedCandidate::new("Portal", "Steam"),
        ScannedCandidate::new("Portal", "Steam"),
    ];
    let (service, catalog) =
        service_with(MockScanner::yielding("Steam", candidates)).await;
    catalog
        .games()
        .insert(NewGame::new("Half-Life", "Steam"))
        .await
        .expect("seed");

    let mut complete = service.events().subscribe_complete();
    service.request_scan("Steam").expect("accepted");

    let result = next_complete(&mut complete).await;
    assert_eq!(result.added, 1);
    assert_eq!(result.candidates.len(), 3);
    assert_eq!(catalog.games().count().await.expect("count"), 2);
    wait_for_idle(&service).await;
}

#[tokio::test]
async fn concurrent_platform_resolution_yields_one_row() {
    let catalog = Catalog::in_memory().await.expect("catalog");

    let a = catalog.clone();
    let b = catalog.clone();
    let (left, right) = tokio::join!(
        tokio::spawn(async move { a.platforms().get_or_create("Steam").await }),
        tokio::spawn(async move { b.platforms().get_or_create("Steam").await }),
    );
    let left = left.expect("join").expect("resolve");
    let right = right.expect("join").expect("resolve");

    assert_eq!(left.id, right.id);
    let platforms = catalog.platforms().list().await.expect("list");
    assert_eq!(platforms.len(), 1);
    assert_eq!(platforms[0].name, "Steam");
}

#[tokio::test]
async fn concurrent_ingestion_of_identical_batches_inserts_once() {
    // Both batches may pass the duplicate pre-check before either inserts;
    // the unique (title, platform) constraint turns the loser into a skip.
    let catalog = Catalog::in_memory().await.expect("catalog");
    let candidates = steam_candidates();

    let left_ingestor = Ingestor::new(catalog.clone());
    let right_ingestor = Ingestor::new(catalog.clone());
    let (left, right) = tokio::join!(
        left_ingestor.ingest(&candidates),
        right_ingestor.ingest(&candidates),
    );

    assert_eq!(left.added + right.added, 2);
    assert_eq!(left.skipped + right.skipped, 2);
    assert_eq!(catalog.games().count().await.expect("count"), 2);
}

#[tokio::test]
async fn cancellation_before_ingestion_discards_all_output() {
    let gate = Arc::new(Gate::default());
    let (service, catalog) = service_with(MockScanner::gated(
        "Steam",
        steam_candidates(),
        Arc::clone(&gate),
    ))
    .await;
    let mut progress = service.events().subscribe_progress();
    let mut complete = service.events().subscribe_complete();

    let task_id = service.request_scan("Steam").expect("accepted");

    // Park the scanner mid-scan, cancel, then let it run to its natural end.
    gate.wait_entered().await;
    assert!(service.cancel_scan(task_id));
    assert!(service.active_scans().is_empty());
    gate.open();

    let terminal = next_terminal(&mut progress).await;
    assert_eq!(terminal.phase, Some(ScanPhase::Cancelled));
    assert!(terminal.error.is_none());

    wait_for_idle(&service).await;
    assert_eq!(catalog.games().count().await.expect("count"), 0);
    assert!(matches!(
        complete.try_recv(),
        Err(broadcast::error::TryRecvError::Empty)
    ));
}

#[tokio::test]
async fn cancel_after_completion_returns_false() {
    let (service, _catalog) =
        service_with(MockScanner::yielding("Steam", steam_candidates())).await;
    let mut complete = service.events().subscribe_complete();

    let task_id = service.request_scan("Steam").expect("accepted");
    next_complete(&mut complete).await;
    wait_for_idle(&service).await;

    assert!(!service.cancel_scan(task_id));
    assert!(!service.cancel_scan(ScanTaskId::new()));
}

#[tokio::test]
async fn steam_scan_populates_an_empty_catalog() {
    let (service, catalog) =
        service_with(MockScanner::yielding("Steam", steam_candidates())).await;
    let mut progress = service.events().subscribe_progress();
    let mut complete = service.events().subscribe_complete();

    service.request_scan("Steam").expect("accepted");

    let result = next_complete(&mut complete).await;
    assert_eq!(result.added, 2);
    assert_eq!(result.platform, "Steam");

    let platforms = catalog.platforms().list().await.expect("platforms");
    assert_eq!(platforms.len(), 1);
    assert_eq!(platforms[0].name, "Steam");

    let games = catalog.games().list().await.expect("games");
    let titles: Vec<&str> = games.iter().map(|g| g.title.as_str()).collect();
    assert_eq!(titles, ["Half-Life", "Portal"]);
    assert!(games.iter().all(|g| g.genre == "Unknown"));

    // Progress stream: start first, fetch updates in emission order, then
    // the terminal done event.
    let first = progress.recv().await.expect("first event");
    assert_eq!(first.phase, Some(ScanPhase::Started));
    let mut fetch_counts = Vec::new();
    loop {
        let event = progress.recv().await.expect("progress");
        if event.done {
            assert_eq!(event.phase, Some(ScanPhase::Done));
            assert_eq!(event.message.as_deref(), Some("Added 2 games"));
            break;
        }
        if event.phase == Some(ScanPhase::Fetching) {
            fetch_counts.push(event.current.expect("current"));
        }
    }
    assert_eq!(fetch_counts, [1, 2]);
    wait_for_idle(&service).await;
}

#[tokio::test]
async fn overlapping_scans_for_one_platform_are_both_visible() {
    let gate = Arc::new(Gate::default());
    let (service, catalog) = service_with(MockScanner::gated(
        "Steam",
        steam_candidates(),
        Arc::clone(&gate),
    ))
    .await;
    let mut complete = service.events().subscribe_complete();

    let first = service.request_scan("Steam").expect("first accepted");
    gate.wait_entered().await;

    // The engine does not police same-platform overlap; callers that want
    // de-duplication consult the registry themselves.
    assert!(service.is_scanning("Steam"));
    let second = service.request_scan("Steam").expect("second accepted");
    assert_ne!(first, second);
    gate.wait_entered().await;

    let tickets = service.active_scans();
    assert_eq!(tickets.len(), 2);
    assert!(tickets.iter().all(|t| t.platform == "Steam"));

    gate.open();
    gate.open();

    let outcomes = [
        next_complete(&mut complete).await,
        next_complete(&mut complete).await,
    ];
    wait_for_idle(&service).await;

    // Whichever batch lands second finds every title already present.
    let added: usize = outcomes.iter().map(|r| r.added).sum();
    assert_eq!(added, 2);
    assert_eq!(catalog.games().count().await.expect("count"), 2);
}
