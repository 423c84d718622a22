pub mod dto;
pub mod handlers;
pub mod server;
pub mod session;

pub use server::{build_router, load_engine, serve, ServerConfig};
