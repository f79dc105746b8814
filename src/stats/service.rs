use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::{
    leaderboard::build_leaderboard,
    models::{LeaderboardEntry, StatisticsSummary},
    personal::summarize,
};
use crate::{
    catalog::repository::CatalogRepository,
    directory::repository::DirectoryRepository,
    sessions::repository::SessionRepository,
    shared::AppError,
};

/// Read-only aggregation over recorded sessions
pub struct StatsService {
    directory: Arc<dyn DirectoryRepository + Send + Sync>,
    catalog: Arc<dyn CatalogRepository + Send + Sync>,
    sessions: Arc<dyn SessionRepository + Send + Sync>,
}

impl StatsService {
    pub fn new(
        directory: Arc<dyn DirectoryRepository + Send + Sync>,
        catalog: Arc<dyn CatalogRepository + Send + Sync>,
        sessions: Arc<dyn SessionRepository + Send + Sync>,
    ) -> Self {
        Self {
            directory,
            catalog,
            sessions,
        }
    }

    #[instrument(skip(self))]
    pub async fn get_leaderboard(&self, group_id: &str) -> Result<Vec<LeaderboardEntry>, AppError> {
        self.directory
            .find_group(group_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {}", group_id)))?;

        let records = self.sessions.find_session_players_by_group(group_id).await?;

        let user_ids: BTreeSet<&str> = records.iter().map(|r| r.user_id.as_str()).collect();
        let mut names = HashMap::with_capacity(user_ids.len());
        for user_id in user_ids {
            match self.directory.find_user(user_id).await? {
                Some(user) => {
                    names.insert(user.id, user.display_name);
                }
                None => warn!(user_id, "Leaderboard row for unknown user"),
            }
        }

        let leaderboard = build_leaderboard(&records, &names);
        debug!(group_id, rows = records.len(), entries = leaderboard.len(), "Leaderboard built");
        Ok(leaderboard)
    }

    #[instrument(skip(self))]
    pub async fn get_user_statistics(&self, user_id: &str) -> Result<StatisticsSummary, AppError> {
        let user = self
            .directory
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))?;

        let records = self.sessions.find_session_players_by_user(user_id).await?;

        let game_ids: BTreeSet<&str> = records.iter().map(|r| r.game_id.as_str()).collect();
        let mut game_names = HashMap::with_capacity(game_ids.len());
        for game_id in game_ids {
            match self.catalog.find_game(game_id).await? {
                Some(game) => {
                    game_names.insert(game.id, game.name);
                }
                None => warn!(game_id, "Session references unknown game"),
            }
        }

        let summary = summarize(&user.id, &user.display_name, &records, &game_names);
        debug!(user_id, total_games = summary.total_games, "Statistics computed");
        Ok(summary)
    }
}
