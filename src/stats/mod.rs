//! Leaderboards and personal statistics, computed on read from recorded
//! session results.

pub use handlers::{get_leaderboard, get_user_statistics};
pub use leaderboard::build_leaderboard;
pub use models::*;
pub use personal::{summarize, win_rate};
pub use service::StatsService;

mod handlers;
pub mod leaderboard;
pub mod models;
pub mod personal;
mod service;
