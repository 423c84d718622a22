use super::AppState;
use crate::dto::{FreeTextRequest, SortRequest};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use facetry::error::FacetryError;
use std::sync::Arc;

/// Replace one facet's selection. The body is the selection itself, e.g.
/// `["X", "Y"]`, `{"min": 10, "max": 50}`, `4` or `true`.
pub async fn set_filter(
    State(state): State<Arc<AppState>>,
    Path((session_id, facet_id)): Path<(String, String)>,
    Json(body): Json<serde_json::Value>,
) -> Result<StatusCode, FacetryError> {
    let handle = state.sessions.get(&session_id)?;
    let mut engine = handle.lock().await;
    engine.set_filter_json(&facet_id, &body)?;
    tracing::debug!(session = %session_id, facet = %facet_id, "[FILTER] set");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_filter(
    State(state): State<Arc<AppState>>,
    Path((session_id, facet_id)): Path<(String, String)>,
) -> Result<StatusCode, FacetryError> {
    let handle = state.sessions.get(&session_id)?;
    handle.lock().await.clear_filter(&facet_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reset every selection and the free-text query.
pub async fn clear_filters(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, FacetryError> {
    let handle = state.sessions.get(&session_id)?;
    handle.lock().await.clear_all_filters();
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_query(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(req): Json<FreeTextRequest>,
) -> Result<StatusCode, FacetryError> {
    let handle = state.sessions.get(&session_id)?;
    handle.lock().await.set_free_text(&req.query);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_sort(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(req): Json<SortRequest>,
) -> Result<StatusCode, FacetryError> {
    let handle = state.sessions.get(&session_id)?;
    handle.lock().await.set_sort(&req.attribute, req.direction)?;
    Ok(StatusCode::NO_CONTENT)
}
