// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::{DashboardService, spawn_refresh_timer};
use crate::application::range_loader::RangeLoader;
use crate::infrastructure::config::{load_app_config, load_sheets_config};
use crate::infrastructure::sheets_repository::GoogleSheetsRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{health_check, list_ranges, refresh_dashboard, show_dashboard};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("induct_monitor=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let sheets_config = load_sheets_config()?;
    let app_config = load_app_config()?;
    let sheets = sheets_config.sheets;

    // Create repository (infrastructure layer)
    let repository = Arc::new(GoogleSheetsRepository::new(
        sheets.sheets_api_base.clone(),
        sheets.drive_api_base.clone(),
        sheets.api_key.clone(),
        sheets.bearer_token.clone(),
        sheets.request_timeout(),
    )?);

    // Create services (application layer)
    let loader = Arc::new(RangeLoader::new(
        repository.clone(),
        sheets.spreadsheet_id.clone(),
        sheets.retry_policy(),
        app_config.dashboard.columns.clone(),
        sheets.cache_ttl(),
    ));
    let dashboard_service = DashboardService::new(loader, repository, &app_config.dashboard);
    tracing::info!(
        ranges = dashboard_service.range_names().len(),
        refresh_secs = dashboard_service.refresh_interval().as_secs(),
        "dashboard configured"
    );

    // Periodic refresh keeps the cache warm between page views
    let _refresh_task = spawn_refresh_timer(dashboard_service.clone());

    // Create application state
    let state = Arc::new(AppState {
        dashboard_service,
        default_show_markers: app_config.dashboard.show_value_markers,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/", get(show_dashboard))
        .route("/healthz", get(health_check))
        .route("/refresh", post(refresh_dashboard))
        .route("/api/ranges", get(list_ranges))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = app_config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid server.bind address '{}'", app_config.server.bind))?;
    tracing::info!("Starting induct-monitor on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
