pub mod schema;
pub mod settings;
pub mod store;
