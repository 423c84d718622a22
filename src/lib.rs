//! In-memory faceted filter-and-sort engine.
//!
//! A [`RecordStore`] holds an immutable catalog. Each [`QueryEngine`] keeps
//! one session's facet selections, free-text query and sort over it, and
//! answers with an ordered result set plus per-facet counts that ignore the
//! facet's own selection.

pub mod error;
pub mod index;
pub mod query;
pub mod types;


pub use error::{FacetryError, Result};
pub use index::schema::{AttributeKind, Schema, SchemaBuilder};
pub use index::settings::EngineSettings;
pub use index::store::{records_from_json, RecordStore};
pub use query::executor::QueryEngine;
pub use query::facet::{FacetDefinition, FacetKind, RangeBucket, ValueDomain};
pub use query::filter::{parse_selection, Selection, ThresholdPolicy, TriState};
pub use query::sort::{SortDirection, SortSpec, STORE_ORDER};
pub use types::{AttributeValue, FacetCounts, FacetHit, QueryResult, Record, RecordId};
