//! Scan orchestration: the task registry, the progress event bus, the
//! scanner capability contract, the ingestion merger, and the service that
//! ties them together. This is the only concurrent part of the system; the
//! registry's task map is its sole piece of shared mutable state.

pub mod capability;
pub mod events;
pub mod ingest;
pub mod registry;
pub mod scanners;
pub mod service;

pub use capability::{PlatformScanner, ProgressSink};
pub use events::ScanEventBus;
pub use ingest::{IngestSummary, Ingestor};
pub use registry::{CancelToken, ScanRegistry};
pub use service::ScanService;
