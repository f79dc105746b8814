use async_trait::async_trait;
use sqlx::{types::Json, PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{GameModel, ScoreTemplateModel};
use crate::scoring::TemplateField;
use crate::shared::AppError;

/// Trait for game and score template storage
#[async_trait]
pub trait CatalogRepository {
    async fn create_game(&self, game: &GameModel) -> Result<(), AppError>;
    async fn find_game(&self, game_id: &str) -> Result<Option<GameModel>, AppError>;
    async fn rename_game(&self, game_id: &str, name: &str) -> Result<(), AppError>;
    /// Removes the game and every template it owns
    async fn delete_game(&self, game_id: &str) -> Result<(), AppError>;

    async fn create_template(&self, template: &ScoreTemplateModel) -> Result<(), AppError>;
    async fn find_template(&self, template_id: &str)
        -> Result<Option<ScoreTemplateModel>, AppError>;
    async fn list_templates(&self, game_id: &str) -> Result<Vec<ScoreTemplateModel>, AppError>;
    async fn update_template(&self, template: &ScoreTemplateModel) -> Result<(), AppError>;
    async fn delete_template(&self, template_id: &str) -> Result<(), AppError>;
}

#[derive(Default)]
struct CatalogTables {
    games: HashMap<String, GameModel>,
    templates: Vec<ScoreTemplateModel>,
}

/// In-memory implementation of CatalogRepository for development and testing
#[derive(Default)]
pub struct InMemoryCatalogRepository {
    tables: RwLock<CatalogTables>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    #[instrument(skip(self, game))]
    async fn create_game(&self, game: &GameModel) -> Result<(), AppError> {
        debug!(game_id = %game.id, name = %game.name, "Creating game in memory");

        let mut tables = self.tables.write().await;
        if tables.games.contains_key(&game.id) {
            return Err(AppError::Conflict("Game already exists".to_string()));
        }
        tables.games.insert(game.id.clone(), game.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_game(&self, game_id: &str) -> Result<Option<GameModel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.games.get(game_id).cloned())
    }

    #[instrument(skip(self))]
    async fn rename_game(&self, game_id: &str, name: &str) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        match tables.games.get_mut(game_id) {
            Some(game) => {
                game.name = name.to_string();
                Ok(())
            }
            None => {
                warn!(game_id, "Game not found for rename in memory");
                Err(AppError::NotFound(format!("Game {}", game_id)))
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete_game(&self, game_id: &str) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if tables.games.remove(game_id).is_none() {
            return Err(AppError::NotFound(format!("Game {}", game_id)));
        }
        tables.templates.retain(|t| t.game_id != game_id);
        Ok(())
    }

    #[instrument(skip(self, template))]
    async fn create_template(&self, template: &ScoreTemplateModel) -> Result<(), AppError> {
        debug!(template_id = %template.id, game_id = %template.game_id, "Creating template in memory");

        let mut tables = self.tables.write().await;
        if !tables.games.contains_key(&template.game_id) {
            return Err(AppError::NotFound(format!("Game {}", template.game_id)));
        }
        if tables.templates.iter().any(|t| t.id == template.id) {
            return Err(AppError::Conflict("Template already exists".to_string()));
        }
        tables.templates.push(template.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_template(
        &self,
        template_id: &str,
    ) -> Result<Option<ScoreTemplateModel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.templates.iter().find(|t| t.id == template_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_templates(&self, game_id: &str) -> Result<Vec<ScoreTemplateModel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .templates
            .iter()
            .filter(|t| t.game_id == game_id)
            .cloned()
            .collect())
    }

    #[instrument(skip(self, template))]
    async fn update_template(&self, template: &ScoreTemplateModel) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        match tables.templates.iter_mut().find(|t| t.id == template.id) {
            Some(existing) => {
                *existing = template.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Template {}", template.id))),
        }
    }

    #[instrument(skip(self))]
    async fn delete_template(&self, template_id: &str) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.templates.len();
        tables.templates.retain(|t| t.id != template_id);
        if tables.templates.len() == before {
            return Err(AppError::NotFound(format!("Template {}", template_id)));
        }
        Ok(())
    }
}

/// Sessions reference games with `ON DELETE RESTRICT`, so a foreign key
/// violation here means the game was played after the service checked.
fn delete_game_error(game_id: &str, error: sqlx::Error) -> AppError {
    match &error {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            warn!(game_id, "Game gained a session while being deleted");
            AppError::Conflict(format!("Game {} has recorded sessions", game_id))
        }
        _ => AppError::from_sqlx(error),
    }
}

/// PostgreSQL implementation of CatalogRepository
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn template_from_row(row: &sqlx::postgres::PgRow) -> ScoreTemplateModel {
    let fields: Json<Vec<TemplateField>> = row.get("fields");
    ScoreTemplateModel {
        id: row.get("id"),
        game_id: row.get("game_id"),
        name: row.get("name"),
        fields: fields.0,
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    #[instrument(skip(self, game))]
    async fn create_game(&self, game: &GameModel) -> Result<(), AppError> {
        sqlx::query("INSERT INTO games (id, name, created_at) VALUES ($1, $2, $3)")
            .bind(&game.id)
            .bind(&game.name)
            .bind(game.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to create game in database");
                AppError::from_sqlx(e)
            })?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_game(&self, game_id: &str) -> Result<Option<GameModel>, AppError> {
        let row = sqlx::query("SELECT id, name, created_at FROM games WHERE id = $1")
            .bind(game_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from_sqlx)?;

        Ok(row.map(|row| GameModel {
            id: row.get("id"),
            name: row.get("name"),
            created_at: row.get("created_at"),
        }))
    }

    #[instrument(skip(self))]
    async fn rename_game(&self, game_id: &str, name: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE games SET name = $2 WHERE id = $1")
            .bind(game_id)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(AppError::from_sqlx)?;

        if result.rows_affected() == 0 {
            warn!(game_id, "Game not found for rename");
            return Err(AppError::NotFound(format!("Game {}", game_id)));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_game(&self, game_id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::from_sqlx)?;

        sqlx::query("DELETE FROM score_templates WHERE game_id = $1")
            .bind(game_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::from_sqlx)?;

        let result = sqlx::query("DELETE FROM games WHERE id = $1")
            .bind(game_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| delete_game_error(game_id, e))?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(AppError::from_sqlx)?;
            return Err(AppError::NotFound(format!("Game {}", game_id)));
        }

        tx.commit().await.map_err(AppError::from_sqlx)?;
        Ok(())
    }

    #[instrument(skip(self, template))]
    async fn create_template(&self, template: &ScoreTemplateModel) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO score_templates (id, game_id, name, fields, updated_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&template.id)
        .bind(&template.game_id)
        .bind(&template.name)
        .bind(Json(&template.fields))
        .bind(template.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, template_id = %template.id, "Failed to create template in database");
            AppError::from_sqlx(e)
        })?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_template(
        &self,
        template_id: &str,
    ) -> Result<Option<ScoreTemplateModel>, AppError> {
        let row = sqlx::query(
            "SELECT id, game_id, name, fields, updated_at FROM score_templates WHERE id = $1",
        )
        .bind(template_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from_sqlx)?;

        Ok(row.as_ref().map(template_from_row))
    }

    #[instrument(skip(self))]
    async fn list_templates(&self, game_id: &str) -> Result<Vec<ScoreTemplateModel>, AppError> {
        let rows = sqlx::query(
            "SELECT id, game_id, name, fields, updated_at FROM score_templates WHERE game_id = $1 ORDER BY name",
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from_sqlx)?;

        Ok(rows.iter().map(template_from_row).collect())
    }

    #[instrument(skip(self, template))]
    async fn update_template(&self, template: &ScoreTemplateModel) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE score_templates SET name = $2, fields = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(&template.id)
        .bind(&template.name)
        .bind(Json(&template.fields))
        .bind(template.updated_at)
        .execute(&self.pool)
        .await
        .map_err(AppError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Template {}", template.id)));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_template(&self, template_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM score_templates WHERE id = $1")
            .bind(template_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Template {}", template_id)));
        }
        Ok(())
    }
}
