// Public API - what other modules can use
pub use handlers::{
    create_game, create_template, delete_game, delete_template, list_templates, rename_game,
    update_template,
};
pub use service::CatalogService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
