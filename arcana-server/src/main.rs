//! Arcana server binary: wires the catalog, the scan engine, and the HTTP
//! surface together.

use std::sync::Arc;

use anyhow::Context;
use arcana_core::{Catalog, ScanEventBus, ScanService, SteamScanner};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod errors;
mod handlers;
mod state;

use config::ServerConfig;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,arcana_core=debug,arcana_server=debug")
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::load().context("loading configuration")?;
    info!(database_url = %config.database_url, "opening catalog");

    let catalog = Catalog::connect(&config.database_url)
        .await
        .context("opening catalog database")?;

    let events = Arc::new(ScanEventBus::new(config.event_capacity));
    let mut scans = ScanService::new(catalog.clone(), events);
    scans.register_scanner(Arc::new(SteamScanner::new(catalog.clone())));

    let state = AppState {
        catalog,
        scans: Arc::new(scans),
    };

    let app = handlers::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
