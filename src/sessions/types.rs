use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{SessionModel, SessionPlayerModel};
use crate::scoring::{PlayerInput, ScoreDetails};

/// Request payload for recording a played session in a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSessionRequest {
    pub game_id: String,
    #[serde(default)]
    pub template_id: Option<String>,
    /// Defaults to the time the session is recorded
    #[serde(default)]
    pub played_at: Option<DateTime<Utc>>,
    pub players: Vec<PlayerInput>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionPlayerResponse {
    pub user_id: String,
    pub raw_score: i32,
    pub placement: i32,
    pub points_awarded: i32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub score_details: Option<ScoreDetails>,
}

impl From<SessionPlayerModel> for SessionPlayerResponse {
    fn from(player: SessionPlayerModel) -> Self {
        Self {
            user_id: player.user_id,
            raw_score: player.raw_score,
            placement: player.placement,
            points_awarded: player.points_awarded,
            score_details: player.score_details,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionResponse {
    pub id: String,
    pub group_id: String,
    pub game_id: String,
    pub template_id: Option<String>,
    pub played_at: DateTime<Utc>,
    pub players: Vec<SessionPlayerResponse>,
}

impl From<SessionModel> for SessionResponse {
    fn from(session: SessionModel) -> Self {
        Self {
            id: session.id,
            group_id: session.group_id,
            game_id: session.game_id,
            template_id: session.template_id,
            played_at: session.played_at,
            players: session.players.into_iter().map(Into::into).collect(),
        }
    }
}
