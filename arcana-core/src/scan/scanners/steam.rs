use std::time::Duration;

use arcana_model::{ProgressUpdate, ScanPhase, ScannedCandidate};
use async_trait::async_trait;

use crate::scan::capability::{PlatformScanner, ProgressSink};
use crate::{Catalog, Result};

const PLATFORM: &str = "Steam";
const API_KEY_ENV: &str = "STEAM_API_KEY";

/// Reference Steam integration.
///
/// The prerequisite check looks for a stored Steam API key in the catalog,
/// falling back to the `STEAM_API_KEY` environment variable. The scan itself
/// still walks a stub listing with simulated fetch latency.
// TODO: replace the stub listing with the GetOwnedGames call against the
// Steam Web API once per-user key selection is wired through.
#[derive(Debug, Clone)]
pub struct SteamScanner {
    catalog: Catalog,
}

impl SteamScanner {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl PlatformScanner for SteamScanner {
    fn name(&self) -> &str {
        PLATFORM
    }

    async fn can_run(&self) -> Result<bool> {
        if self
            .catalog
            .api_keys()
            .find_for_platform(PLATFORM)
            .await?
            .is_some()
        {
            return Ok(true);
        }
        Ok(std::env::var(API_KEY_ENV).is_ok_and(|v| !v.trim().is_empty()))
    }

    async fn scan(
        &self,
        progress: &ProgressSink,
    ) -> Result<Vec<ScannedCandidate>> {
        progress.report(
            ProgressUpdate::phase(ScanPhase::Started)
                .with_message("Starting Steam scan"),
        );

        let library = ["Half-Life", "Portal", "Cyberpunk 2077"];
        let total = library.len();
        let mut candidates = Vec::with_capacity(total);

        for (index, title) in library.iter().enumerate() {
            if progress.is_cancelled() {
                break;
            }
            progress.report(
                ProgressUpdate::phase(ScanPhase::Fetching)
                    .with_counts(index + 1, total)
                    .with_message(format!("Fetching {title}")),
            );
            // Simulated network latency of the stub listing.
            tokio::time::sleep(Duration::from_millis(150)).await;
            candidates.push(ScannedCandidate {
                title: (*title).to_string(),
                platform: PLATFORM.to_string(),
                genre: None,
                tags: Vec::new(),
                release_date: None,
            });
        }

        progress.report(
            ProgressUpdate::phase(ScanPhase::Finalizing)
                .with_message("Assembling results"),
        );
        tokio::time::sleep(Duration::from_millis(100)).await;

        Ok(candidates)
    }
}
