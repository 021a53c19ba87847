//! Core data model definitions shared across Arcana crates.

pub mod catalog;
pub mod ids;
pub mod scan;

// Intentionally curated re-exports for downstream consumers.
pub use catalog::{
    ApiKey, Collection, CollectionWithGames, Game, GamePatch, NewApiKey,
    NewGame, Platform, User,
};
pub use ids::{ApiKeyId, CollectionId, GameId, PlatformId, ScanTaskId, UserId};
pub use scan::{
    ProgressUpdate, ScanEvent, ScanPhase, ScanProgress, ScanResult,
    ScanTicket, ScannedCandidate,
};
