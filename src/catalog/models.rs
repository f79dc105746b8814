use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoring::TemplateField;

/// Database model for games table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameModel {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl GameModel {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            created_at: Utc::now(),
        }
    }
}

/// Database model for score_templates table. Fields are stored in order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreTemplateModel {
    pub id: String,
    pub game_id: String,
    pub name: String,
    pub fields: Vec<TemplateField>,
    pub updated_at: DateTime<Utc>,
}

impl ScoreTemplateModel {
    pub fn new(game_id: String, name: String, fields: Vec<TemplateField>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            game_id,
            name,
            fields,
            updated_at: Utc::now(),
        }
    }
}
