use arcana_model::{NewGame, ScannedCandidate};
use tracing::{debug, warn};

use crate::{Catalog, CatalogError, Result};

/// Counts for one completed ingestion batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub added: usize,
    pub skipped: usize,
}

/// Merges a completed scan's candidate list into the catalog.
///
/// Candidates are processed in input order. Platform resolution is
/// get-or-create by name (race-safe against other concurrent batches), the
/// dedupe key is (title, platform), and every per-item failure is absorbed:
/// one bad candidate never aborts the batch, it only lowers `added`.
#[derive(Debug, Clone)]
pub struct Ingestor {
    catalog: Catalog,
}

impl Ingestor {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub async fn ingest(&self, candidates: &[ScannedCandidate]) -> IngestSummary {
        let mut summary = IngestSummary::default();
        for candidate in candidates {
            match self.ingest_one(candidate).await {
                Ok(true) => summary.added += 1,
                Ok(false) => {
                    summary.skipped += 1;
                    debug!(
                        title = %candidate.title,
                        platform = %candidate.platform,
                        "duplicate candidate skipped"
                    );
                }
                Err(error) => {
                    summary.skipped += 1;
                    warn!(
                        title = %candidate.title,
                        platform = %candidate.platform,
                        %error,
                        "candidate ingestion failed"
                    );
                }
            }
        }
        summary
    }

    /// Returns Ok(true) on insert, Ok(false) for a detected duplicate.
    async fn ingest_one(&self, candidate: &ScannedCandidate) -> Result<bool> {
        let platform = self
            .catalog
            .platforms()
            .get_or_create(&candidate.platform)
            .await?;

        let games = self.catalog.games();
        if games.exists(&candidate.title, platform.id).await? {
            return Ok(false);
        }

        let new = NewGame {
            title: candidate.title.clone(),
            platform: candidate.platform.clone(),
            genre: candidate.genre.clone(),
            tags: candidate.tags.clone(),
            release_date: candidate.release_date.clone(),
            ..Default::default()
        };
        // The pre-check races against other batches; whoever loses hits the
        // UNIQUE(title, platform_id) constraint and counts as a skip.
        match games.insert_for_platform(new, &platform).await {
            Ok(_) => Ok(true),
            Err(CatalogError::Database(sqlx::Error::Database(ref db)))
                if db.is_unique_violation() =>
            {
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}
