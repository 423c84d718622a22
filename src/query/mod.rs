pub mod executor;
pub mod facet;
pub mod filter;
pub mod sort;
