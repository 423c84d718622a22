use super::AppState;
use crate::dto::{
    FacetCountsResponse, FacetsResponse, SearchFacetValuesRequest, SearchFacetValuesResponse,
};
use axum::{
    extract::{Path, State},
    Json,
};
use facetry::error::FacetryError;
use facetry::FacetDefinition;
use std::sync::Arc;
use std::time::Instant;

/// Facet definitions served by this catalog.
pub async fn list_facets(State(state): State<Arc<AppState>>) -> Json<Vec<FacetDefinition>> {
    Json(state.sessions.template().facets().cloned().collect())
}

/// Counts-excluding-self for every facet of the session.
pub async fn get_all_facet_counts(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<FacetsResponse>, FacetryError> {
    let start = Instant::now();
    let handle = state.sessions.get(&session_id)?;
    let engine = handle.lock().await;
    Ok(Json(FacetsResponse {
        facets: engine.all_counts(),
        active_filter_count: engine.active_filter_count(),
        processing_time_ms: start.elapsed().as_millis() as u64,
    }))
}

pub async fn get_facet_counts(
    State(state): State<Arc<AppState>>,
    Path((session_id, facet_id)): Path<(String, String)>,
) -> Result<Json<FacetCountsResponse>, FacetryError> {
    let handle = state.sessions.get(&session_id)?;
    let counts = handle.lock().await.counts_for(&facet_id)?;
    Ok(Json(FacetCountsResponse {
        facet: facet_id,
        counts,
    }))
}

/// Search one facet's values. An empty body searches with an empty query.
pub async fn search_facet_values(
    State(state): State<Arc<AppState>>,
    Path((session_id, facet_id)): Path<(String, String)>,
    body: axum::body::Bytes,
) -> Result<Json<SearchFacetValuesResponse>, FacetryError> {
    let start = Instant::now();

    let req: SearchFacetValuesRequest = if body.is_empty() {
        SearchFacetValuesRequest::default()
    } else {
        serde_json::from_slice(&body)?
    };

    let handle = state.sessions.get(&session_id)?;
    let facet_hits = handle
        .lock()
        .await
        .search_facet_values(&facet_id, &req.facet_query, req.max_facet_hits)?;

    Ok(Json(SearchFacetValuesResponse {
        facet_hits,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }))
}
