// Public API - what other modules can use
pub use handlers::record_session;
pub use service::SessionService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
