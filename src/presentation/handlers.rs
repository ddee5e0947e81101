// HTTP request handlers
use crate::domain::range_table::LoadedRanges;
use crate::presentation::app_state::AppState;
use crate::presentation::html_page::render_dashboard_page;
use axum::{
    Form, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Redirect},
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct MarkersParam {
    pub markers: Option<bool>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Render the dashboard, loading tables from cache when fresh
pub async fn show_dashboard(
    Query(query): Query<MarkersParam>,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, (StatusCode, String)> {
    let show_markers = query.markers.unwrap_or(state.default_show_markers);
    let dashboard = state.dashboard_service.build_dashboard(show_markers).await;
    render_dashboard_page(&dashboard).map(Html).map_err(|e| {
        tracing::error!("Failed to render dashboard page: {:#}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render dashboard".to_string())
    })
}

/// Manual refresh: drop the cache, re-fetch, then return to the dashboard
pub async fn refresh_dashboard(
    State(state): State<Arc<AppState>>,
    Form(form): Form<MarkersParam>,
) -> Redirect {
    let refreshed = state.dashboard_service.refresh().await;
    if refreshed.is_degraded() {
        tracing::warn!("manual refresh degraded");
    }

    let show_markers = form.markers.unwrap_or(state.default_show_markers);
    Redirect::to(&format!("/?markers={}", show_markers))
}

/// Loaded tables as JSON
pub async fn list_ranges(State(state): State<Arc<AppState>>) -> Json<LoadedRanges> {
    let loaded = state.dashboard_service.tables().await;
    Json(loaded.as_ref().clone())
}
