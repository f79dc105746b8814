use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use super::{
    dense_placements, template::compute_raw_score, PointsPolicy, ScoreDetails, ScoringError,
    TemplateField,
};

/// A player's result as entered by the caller: either a final score or a
/// filled-in scorecard, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, try_from = "PlayerInputBody")]
pub enum PlayerInput {
    Detailed {
        user_id: String,
        score_details: ScoreDetails,
    },
    Raw {
        user_id: String,
        raw_score: i32,
    },
}

/// Wire shape of a player entry before the two forms are told apart.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PlayerInputBody {
    user_id: String,
    raw_score: Option<i32>,
    score_details: Option<ScoreDetails>,
}

impl TryFrom<PlayerInputBody> for PlayerInput {
    type Error = String;

    fn try_from(body: PlayerInputBody) -> Result<Self, Self::Error> {
        match (body.raw_score, body.score_details) {
            (Some(raw_score), None) => Ok(PlayerInput::Raw {
                user_id: body.user_id,
                raw_score,
            }),
            (None, Some(score_details)) => Ok(PlayerInput::Detailed {
                user_id: body.user_id,
                score_details,
            }),
            (Some(_), Some(_)) => Err(format!(
                "player {} has both raw_score and score_details",
                body.user_id
            )),
            (None, None) => Err(format!(
                "player {} needs raw_score or score_details",
                body.user_id
            )),
        }
    }
}

impl PlayerInput {
    pub fn raw(user_id: &str, raw_score: i32) -> Self {
        PlayerInput::Raw {
            user_id: user_id.to_string(),
            raw_score,
        }
    }

    pub fn detailed(user_id: &str, score_details: ScoreDetails) -> Self {
        PlayerInput::Detailed {
            user_id: user_id.to_string(),
            score_details,
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            PlayerInput::Detailed { user_id, .. } => user_id,
            PlayerInput::Raw { user_id, .. } => user_id,
        }
    }
}

/// A player's result with placement and league points filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredPlayer {
    pub user_id: String,
    pub raw_score: i32,
    pub placement: i32,
    pub points_awarded: i32,
    pub score_details: Option<ScoreDetails>,
}

/// Ranks the players of one session and awards league points.
#[derive(Clone)]
pub struct SessionScorer {
    policy: Arc<dyn PointsPolicy>,
}

impl SessionScorer {
    pub fn new(policy: Arc<dyn PointsPolicy>) -> Self {
        Self { policy }
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Scores `players` and returns them in input order.
    ///
    /// `template` is the field list of the score template the session uses, if
    /// any. Scorecard entries are only accepted when a template is given.
    pub fn score(
        &self,
        template: Option<&[TemplateField]>,
        players: &[PlayerInput],
    ) -> Result<Vec<ScoredPlayer>, ScoringError> {
        if players.is_empty() {
            return Err(ScoringError::EmptySession);
        }

        let mut seen = HashSet::new();
        for player in players {
            if !seen.insert(player.user_id()) {
                return Err(ScoringError::DuplicatePlayer(player.user_id().to_string()));
            }
        }

        let mut raw_scores = Vec::with_capacity(players.len());
        for player in players {
            let raw_score = match (player, template) {
                (PlayerInput::Raw { raw_score, .. }, _) => *raw_score,
                (PlayerInput::Detailed { score_details, .. }, Some(fields)) => {
                    compute_raw_score(fields, score_details)?
                }
                (PlayerInput::Detailed { user_id, .. }, None) => {
                    return Err(ScoringError::MissingTemplate(user_id.clone()));
                }
            };
            raw_scores.push(raw_score);
        }

        let placements = dense_placements(&raw_scores);
        let player_count = players.len();

        Ok(players
            .iter()
            .zip(raw_scores)
            .zip(placements)
            .map(|((player, raw_score), placement)| ScoredPlayer {
                user_id: player.user_id().to_string(),
                raw_score,
                placement,
                points_awarded: self.policy.points(placement, player_count),
                score_details: match player {
                    PlayerInput::Detailed { score_details, .. } => Some(score_details.clone()),
                    PlayerInput::Raw { .. } => None,
                },
            })
            .collect())
    }
}

impl Default for SessionScorer {
    fn default() -> Self {
        Self::new(Arc::new(super::LinearPoints))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::WinnerTakesAllPoints;

    fn wonders_template() -> Vec<TemplateField> {
        vec![
            TemplateField::numeric("military", "Military"),
            TemplateField::numeric("treasury", "Treasury"),
            TemplateField::numeric("wonders", "Wonders"),
        ]
    }

    #[test]
    fn ranks_raw_scores_and_awards_linear_points() {
        let scorer = SessionScorer::default();
        let players = vec![
            PlayerInput::raw("bob", 31),
            PlayerInput::raw("alice", 45),
            PlayerInput::raw("carol", 12),
        ];

        let scored = scorer.score(None, &players).unwrap();

        let summary: Vec<(&str, i32, i32)> = scored
            .iter()
            .map(|p| (p.user_id.as_str(), p.placement, p.points_awarded))
            .collect();
        assert_eq!(
            summary,
            vec![("bob", 2, 2), ("alice", 1, 3), ("carol", 3, 1)]
        );
    }

    #[test]
    fn tied_players_share_placement_and_points() {
        let scorer = SessionScorer::default();
        let players = vec![
            PlayerInput::raw("alice", 20),
            PlayerInput::raw("bob", 20),
            PlayerInput::raw("carol", 5),
        ];

        let scored = scorer.score(None, &players).unwrap();
        assert_eq!(scored[0].placement, 1);
        assert_eq!(scored[1].placement, 1);
        assert_eq!(scored[2].placement, 2);
        assert_eq!(scored[0].points_awarded, scored[1].points_awarded);
        assert_eq!(scored[2].points_awarded, 2);
    }

    #[test]
    fn computes_raw_scores_from_score_details() {
        let scorer = SessionScorer::default();
        let template = wonders_template();
        let players = vec![
            PlayerInput::detailed(
                "alice",
                ScoreDetails::new()
                    .with("military", 2)
                    .with("treasury", 4)
                    .with("wonders", 0),
            ),
            PlayerInput::detailed("bob", ScoreDetails::new().with("wonders", 9)),
        ];

        let scored = scorer.score(Some(&template), &players).unwrap();
        assert_eq!(scored[0].raw_score, 6);
        assert_eq!(scored[1].raw_score, 9);
        assert_eq!(scored[1].placement, 1);
        assert!(scored[0].score_details.is_some());
    }

    #[test]
    fn mixes_raw_and_detailed_entries_under_a_template() {
        let scorer = SessionScorer::default();
        let template = wonders_template();
        let players = vec![
            PlayerInput::raw("alice", 10),
            PlayerInput::detailed("bob", ScoreDetails::new().with("military", 11)),
        ];

        let scored = scorer.score(Some(&template), &players).unwrap();
        assert_eq!(scored[0].score_details, None);
        assert_eq!(scored[1].placement, 1);
    }

    #[test]
    fn rejects_empty_sessions() {
        let scorer = SessionScorer::default();
        assert_eq!(scorer.score(None, &[]), Err(ScoringError::EmptySession));
    }

    #[test]
    fn rejects_duplicate_players() {
        let scorer = SessionScorer::default();
        let players = vec![
            PlayerInput::raw("alice", 1),
            PlayerInput::raw("bob", 2),
            PlayerInput::raw("alice", 3),
        ];
        assert_eq!(
            scorer.score(None, &players),
            Err(ScoringError::DuplicatePlayer("alice".to_string()))
        );
    }

    #[test]
    fn rejects_unknown_scorecard_fields() {
        let scorer = SessionScorer::default();
        let template = wonders_template();
        let players = vec![PlayerInput::detailed(
            "alice",
            ScoreDetails::new().with("science", 3),
        )];
        assert_eq!(
            scorer.score(Some(&template), &players),
            Err(ScoringError::UnknownField("science".to_string()))
        );
    }

    #[test]
    fn scorecards_need_a_template() {
        let scorer = SessionScorer::default();
        let players = vec![PlayerInput::detailed(
            "alice",
            ScoreDetails::new().with("military", 3),
        )];
        assert_eq!(
            scorer.score(None, &players),
            Err(ScoringError::MissingTemplate("alice".to_string()))
        );
    }

    #[test]
    fn winner_never_earns_less_than_last_place() {
        let players: Vec<PlayerInput> = (0..6)
            .map(|i| PlayerInput::raw(&format!("player-{i}"), i * 3))
            .collect();

        for scorer in [
            SessionScorer::default(),
            SessionScorer::new(Arc::new(WinnerTakesAllPoints)),
        ] {
            let scored = scorer.score(None, &players).unwrap();
            assert_eq!(scored.len(), players.len());

            let first = scored.iter().find(|p| p.placement == 1).unwrap();
            let last = scored.iter().max_by_key(|p| p.placement).unwrap();
            assert!(first.points_awarded >= last.points_awarded);
            assert!(scored
                .iter()
                .all(|p| p.placement >= 1 && p.placement <= players.len() as i32));
        }
    }

    #[test]
    fn player_input_deserializes_both_shapes() {
        let raw: PlayerInput =
            serde_json::from_str(r#"{"user_id": "alice", "raw_score": 12}"#).unwrap();
        assert_eq!(raw, PlayerInput::raw("alice", 12));

        let detailed: PlayerInput =
            serde_json::from_str(r#"{"user_id": "bob", "score_details": {"wonders": 4}}"#)
                .unwrap();
        assert_eq!(
            detailed,
            PlayerInput::detailed("bob", ScoreDetails::new().with("wonders", 4))
        );
    }

    #[test]
    fn player_input_rejects_mixed_and_incomplete_entries() {
        let mixed = serde_json::from_str::<PlayerInput>(
            r#"{"user_id": "alice", "raw_score": 99, "score_details": {"a": 1}}"#,
        );
        assert!(mixed
            .unwrap_err()
            .to_string()
            .contains("both raw_score and score_details"));

        let bare = serde_json::from_str::<PlayerInput>(r#"{"user_id": "alice"}"#);
        assert!(bare.is_err());

        let extra = serde_json::from_str::<PlayerInput>(
            r#"{"user_id": "alice", "raw_score": 3, "bonus": 1}"#,
        );
        assert!(extra.is_err());
    }

    #[test]
    fn player_input_serializes_without_a_tag() {
        let value = serde_json::to_value(PlayerInput::raw("alice", 12)).unwrap();
        assert_eq!(value, serde_json::json!({"user_id": "alice", "raw_score": 12}));
    }
}
