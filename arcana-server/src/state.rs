use std::sync::Arc;

use arcana_core::{Catalog, ScanService};

#[derive(Debug, Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub scans: Arc<ScanService>,
}
