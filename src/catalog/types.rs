use serde::{Deserialize, Serialize};

use super::models::{GameModel, ScoreTemplateModel};
use crate::scoring::TemplateField;

#[derive(Debug, Deserialize)]
pub struct GameRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GameResponse {
    pub id: String,
    pub name: String,
}

impl From<GameModel> for GameResponse {
    fn from(game: GameModel) -> Self {
        Self {
            id: game.id,
            name: game.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub fields: Vec<TemplateField>,
}

/// Partial update; omitted parts keep their current value
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTemplateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: Option<Vec<TemplateField>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TemplateResponse {
    pub id: String,
    pub game_id: String,
    pub name: String,
    pub fields: Vec<TemplateField>,
}

impl From<ScoreTemplateModel> for TemplateResponse {
    fn from(template: ScoreTemplateModel) -> Self {
        Self {
            id: template.id,
            game_id: template.game_id,
            name: template.name,
            fields: template.fields,
        }
    }
}
