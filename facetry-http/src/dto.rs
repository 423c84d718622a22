use facetry::{FacetCounts, FacetHit, RecordId, SortDirection, SortSpec};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: String,
}

/// Current state of one session. Each selection is in the same shape
/// `PUT .../filters/{facet}` takes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: String,
    pub selections: IndexMap<String, serde_json::Value>,
    pub query: String,
    pub sort: SortSpec,
    pub active_filter_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct FreeTextRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct SortRequest {
    pub attribute: String,
    #[serde(default)]
    pub direction: SortDirection,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsResponse {
    pub ids: Vec<RecordId>,
    pub total: usize,
    pub active_filter_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hits: Option<Vec<serde_json::Value>>,
    #[serde(rename = "processingTimeMS")]
    pub processing_time_ms: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsParams {
    /// Include full records alongside the ids.
    #[serde(default)]
    pub include_records: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetsResponse {
    pub facets: IndexMap<String, FacetCounts>,
    pub active_filter_count: usize,
    #[serde(rename = "processingTimeMS")]
    pub processing_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct FacetCountsResponse {
    pub facet: String,
    pub counts: FacetCounts,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFacetValuesRequest {
    #[serde(default)]
    pub facet_query: String,

    #[serde(default = "default_max_facet_hits")]
    pub max_facet_hits: usize,
}

fn default_max_facet_hits() -> usize {
    10
}

impl Default for SearchFacetValuesRequest {
    fn default() -> Self {
        SearchFacetValuesRequest {
            facet_query: String::new(),
            max_facet_hits: default_max_facet_hits(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFacetValuesResponse {
    pub facet_hits: Vec<FacetHit>,
    #[serde(rename = "processingTimeMS")]
    pub processing_time_ms: u64,
}
