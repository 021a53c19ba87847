//! Concrete platform integrations. Add new storefront scanners here and
//! register them on the [`ScanService`](crate::scan::ScanService).

mod steam;

pub use steam::SteamScanner;
