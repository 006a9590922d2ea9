//! HTTP server: route table, handlers and the builder that wires them to a store

pub mod builder;
pub mod envelope;
pub mod handlers;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use envelope::ApiResponse;
pub use host::AppState;
