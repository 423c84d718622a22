use crate::session::SessionRegistry;

pub mod facets;
pub mod filters;
pub mod health;
pub mod search;
pub mod sessions;

pub use facets::{get_all_facet_counts, get_facet_counts, list_facets, search_facet_values};
pub use filters::{clear_filter, clear_filters, set_filter, set_query, set_sort};
pub use health::health;
pub use search::get_results;
pub use sessions::{create_session, delete_session, get_session};

pub struct AppState {
    pub sessions: SessionRegistry,
    pub start_time: std::time::Instant,
}
