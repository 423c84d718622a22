use super::AppState;
use crate::dto::{ResultsParams, ResultsResponse};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use facetry::error::FacetryError;
use std::sync::Arc;
use std::time::Instant;

/// Matching record ids in sort order. `?includeRecords=true` adds the
/// records themselves as `hits`.
pub async fn get_results(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Query(params): Query<ResultsParams>,
) -> Result<Json<ResultsResponse>, FacetryError> {
    let start = Instant::now();
    let handle = state.sessions.get(&session_id)?;
    let engine = handle.lock().await;

    let ids = engine.run();
    let hits = params.include_records.then(|| {
        ids.iter()
            .filter_map(|id| engine.record(id))
            .map(|record| record.to_json())
            .collect()
    });

    Ok(Json(ResultsResponse {
        total: ids.len(),
        ids,
        active_filter_count: engine.active_filter_count(),
        hits,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }))
}
