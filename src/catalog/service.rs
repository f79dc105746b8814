use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{GameModel, ScoreTemplateModel},
    repository::CatalogRepository,
    types::{CreateTemplateRequest, GameRequest, GameResponse, TemplateResponse, UpdateTemplateRequest},
};
use crate::{
    scoring::validate_fields, sessions::repository::SessionRepository, shared::AppError,
};

/// Service for games and their score templates
pub struct CatalogService {
    repository: Arc<dyn CatalogRepository + Send + Sync>,
    session_repository: Arc<dyn SessionRepository + Send + Sync>,
}

impl CatalogService {
    pub fn new(
        repository: Arc<dyn CatalogRepository + Send + Sync>,
        session_repository: Arc<dyn SessionRepository + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            session_repository,
        }
    }

    #[instrument(skip(self, request))]
    pub async fn create_game(&self, request: GameRequest) -> Result<GameResponse, AppError> {
        let game = GameModel::new(required_name(&request.name)?);
        self.repository.create_game(&game).await?;

        info!(game_id = %game.id, name = %game.name, "Game created");
        Ok(game.into())
    }

    #[instrument(skip(self))]
    pub async fn get_game(&self, game_id: &str) -> Result<GameModel, AppError> {
        self.repository
            .find_game(game_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Game {}", game_id)))
    }

    #[instrument(skip(self, request))]
    pub async fn rename_game(
        &self,
        game_id: &str,
        request: GameRequest,
    ) -> Result<GameResponse, AppError> {
        let name = required_name(&request.name)?;
        self.repository.rename_game(game_id, &name).await?;

        info!(game_id, name = %name, "Game renamed");
        Ok(self.get_game(game_id).await?.into())
    }

    /// Deletes a game and its templates, unless a recorded session still
    /// references it
    #[instrument(skip(self))]
    pub async fn delete_game(&self, game_id: &str) -> Result<(), AppError> {
        self.get_game(game_id).await?;

        let sessions = self.session_repository.count_sessions_for_game(game_id).await?;
        if sessions > 0 {
            warn!(game_id, sessions, "Refusing to delete a game with recorded sessions");
            return Err(AppError::Conflict(format!(
                "Game has {} recorded session(s)",
                sessions
            )));
        }

        self.repository.delete_game(game_id).await?;
        info!(game_id, "Game deleted");
        Ok(())
    }

    #[instrument(skip(self, request))]
    pub async fn create_template(
        &self,
        game_id: &str,
        request: CreateTemplateRequest,
    ) -> Result<TemplateResponse, AppError> {
        self.get_game(game_id).await?;
        validate_fields(&request.fields)?;

        let template = ScoreTemplateModel::new(
            game_id.to_string(),
            required_name(&request.name)?,
            request.fields,
        );
        self.repository.create_template(&template).await?;

        info!(template_id = %template.id, game_id, fields = template.fields.len(), "Template created");
        Ok(template.into())
    }

    #[instrument(skip(self))]
    pub async fn get_template(&self, template_id: &str) -> Result<ScoreTemplateModel, AppError> {
        self.repository
            .find_template(template_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Template {}", template_id)))
    }

    #[instrument(skip(self))]
    pub async fn list_templates(&self, game_id: &str) -> Result<Vec<TemplateResponse>, AppError> {
        self.get_game(game_id).await?;
        let templates = self.repository.list_templates(game_id).await?;
        Ok(templates.into_iter().map(Into::into).collect())
    }

    /// Sessions recorded under the old field set keep their stored breakdowns
    #[instrument(skip(self, request))]
    pub async fn update_template(
        &self,
        template_id: &str,
        request: UpdateTemplateRequest,
    ) -> Result<TemplateResponse, AppError> {
        let mut template = self.get_template(template_id).await?;

        if let Some(name) = request.name {
            template.name = required_name(&name)?;
        }
        if let Some(fields) = request.fields {
            validate_fields(&fields)?;
            template.fields = fields;
        }
        template.updated_at = Utc::now();

        self.repository.update_template(&template).await?;
        info!(template_id, "Template updated");
        Ok(template.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_template(&self, template_id: &str) -> Result<(), AppError> {
        self.repository.delete_template(template_id).await?;
        info!(template_id, "Template deleted");
        Ok(())
    }
}

fn required_name(value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    Ok(trimmed.to_string())
}
