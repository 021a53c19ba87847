//! Arcana core: the catalog store and the scan orchestration engine.
//!
//! The catalog is a normalized SQLite store for platforms, games,
//! collections, users, and API keys. The scan engine launches one detached
//! task per accepted scan, tracks live scans in a registry, streams progress
//! over an in-process event bus, supports cooperative cancellation, and
//! merges scan output into the catalog with per-item failure isolation.

pub mod catalog;
pub mod database;
pub mod error;
pub mod scan;

pub use arcana_model as model;
pub use database::Catalog;
pub use error::{CatalogError, Result};
pub use scan::{
    CancelToken, IngestSummary, Ingestor, PlatformScanner, ProgressSink,
    ScanEventBus, ScanRegistry, ScanService,
};
pub use scan::scanners::SteamScanner;
