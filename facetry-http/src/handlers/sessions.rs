use super::AppState;
use crate::dto::{CreateSessionResponse, SessionResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use facetry::error::FacetryError;
use indexmap::IndexMap;
use std::sync::Arc;

pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), FacetryError> {
    let session_id = state.sessions.create()?;
    Ok((StatusCode::CREATED, Json(CreateSessionResponse { session_id })))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, FacetryError> {
    let handle = state.sessions.get(&session_id)?;
    let engine = handle.lock().await;

    let selections: IndexMap<_, _> = engine
        .facets()
        .filter_map(|def| {
            engine
                .selection(&def.id)
                .map(|selection| (def.id.clone(), selection.to_json()))
        })
        .collect();

    Ok(Json(SessionResponse {
        session_id,
        selections,
        query: engine.free_text().to_string(),
        sort: engine.sort_spec().clone(),
        active_filter_count: engine.active_filter_count(),
    }))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, FacetryError> {
    state.sessions.remove(&session_id)?;
    Ok(StatusCode::NO_CONTENT)
}
