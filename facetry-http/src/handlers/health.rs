use axum::{extract::State, Json};
use std::sync::Arc;

use super::AppState;

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let template = state.sessions.template();
    Json(serde_json::json!({
        "status": "ok",
        "records": template.records().len(),
        "facets": template.facets().count(),
        "sessions": state.sessions.len(),
        "max_sessions": state.sessions.max_sessions(),
        "build_profile": if cfg!(debug_assertions) { "debug" } else { "release" },
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
