// Public API - what other modules can use
pub use handlers::{add_member, create_group, create_guest, list_members, register_user};
pub use service::DirectoryService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
