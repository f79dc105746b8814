use serde::{Deserialize, Serialize};

/// One ranked row of a group leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub name: String,
    pub total_league_points: i64,
    pub games_played: u32,
    pub average_placement: f64,
}

/// Results of one user in one game, grouped by game name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStat {
    pub game_name: String,
    pub played: u32,
    pub wins: u32,
    /// Percentage of wins, rounded half up
    pub win_rate: u32,
}

/// A non-empty bucket of the placement distribution chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementSlice {
    pub label: String,
    pub value: u32,
}

impl PlacementSlice {
    pub fn new(label: &str, value: u32) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsSummary {
    pub user_id: String,
    pub display_name: String,
    pub total_games: u32,
    pub wins: u32,
    pub second: u32,
    pub third: u32,
    /// Sessions finished in last place; solo sessions never count
    pub last: u32,
    /// Every game played, ordered by game name
    pub per_game: Vec<GameStat>,
    /// At most ten games, most played first
    pub top_games: Vec<GameStat>,
    pub placement_distribution: Vec<PlacementSlice>,
}
