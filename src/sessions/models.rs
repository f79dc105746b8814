use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoring::{ScoreDetails, ScoredPlayer};

/// Database model for sessions table, with its players in recorded order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionModel {
    pub id: String,
    pub group_id: String,
    pub game_id: String,
    pub template_id: Option<String>,
    pub played_at: DateTime<Utc>,
    pub players: Vec<SessionPlayerModel>,
}

/// Database model for session_players table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionPlayerModel {
    pub id: String,
    pub session_id: String,
    pub user_id: String,
    pub raw_score: i32,
    pub placement: i32,
    pub points_awarded: i32,
    pub score_details: Option<ScoreDetails>,
}

impl SessionModel {
    pub fn new(
        group_id: String,
        game_id: String,
        template_id: Option<String>,
        played_at: DateTime<Utc>,
        scored: Vec<ScoredPlayer>,
    ) -> Self {
        let id = Uuid::new_v4().to_string();
        let players = scored
            .into_iter()
            .map(|player| SessionPlayerModel {
                id: Uuid::new_v4().to_string(),
                session_id: id.clone(),
                user_id: player.user_id,
                raw_score: player.raw_score,
                placement: player.placement,
                points_awarded: player.points_awarded,
                score_details: player.score_details,
            })
            .collect();

        Self {
            id,
            group_id,
            game_id,
            template_id,
            played_at,
            players,
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}

/// One player's result joined with the session it belongs to. This is the
/// row shape both aggregators read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SessionPlayerRecord {
    pub session_id: String,
    pub group_id: String,
    pub game_id: String,
    pub user_id: String,
    pub raw_score: i32,
    pub placement: i32,
    pub points_awarded: i32,
    pub player_count: i32,
    pub played_at: DateTime<Utc>,
}

impl SessionPlayerRecord {
    pub fn from_session(session: &SessionModel, player: &SessionPlayerModel) -> Self {
        Self {
            session_id: session.id.clone(),
            group_id: session.group_id.clone(),
            game_id: session.game_id.clone(),
            user_id: player.user_id.clone(),
            raw_score: player.raw_score,
            placement: player.placement,
            points_awarded: player.points_awarded,
            player_count: i32::try_from(session.player_count()).unwrap_or(i32::MAX),
            played_at: session.played_at,
        }
    }
}
