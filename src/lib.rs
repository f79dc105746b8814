// Library crate for the board game league server
// This file exposes the public API for integration tests

pub mod auth;
pub mod catalog;
pub mod config;
pub mod directory;
pub mod routes;
pub mod scoring;
pub mod sessions;
pub mod shared;
pub mod stats;

// Re-export commonly used types for easier access in tests
pub use config::AppConfig;
pub use routes::build_router;
pub use scoring::{PlayerInput, PointsPolicy, PointsScheme, SessionScorer};
pub use shared::{AppError, AppState};
pub use stats::{LeaderboardEntry, StatisticsSummary};
