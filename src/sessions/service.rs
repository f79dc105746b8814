use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{models::SessionModel, repository::SessionRepository, types::RecordSessionRequest};
use crate::{
    catalog::repository::CatalogRepository,
    directory::repository::DirectoryRepository,
    scoring::SessionScorer,
    shared::AppError,
};

/// Service for recording played sessions
pub struct SessionService {
    directory: Arc<dyn DirectoryRepository + Send + Sync>,
    catalog: Arc<dyn CatalogRepository + Send + Sync>,
    repository: Arc<dyn SessionRepository + Send + Sync>,
    scorer: SessionScorer,
}

impl SessionService {
    pub fn new(
        directory: Arc<dyn DirectoryRepository + Send + Sync>,
        catalog: Arc<dyn CatalogRepository + Send + Sync>,
        repository: Arc<dyn SessionRepository + Send + Sync>,
        scorer: SessionScorer,
    ) -> Self {
        Self {
            directory,
            catalog,
            repository,
            scorer,
        }
    }

    /// Validates the players, ranks them, awards league points and stores the
    /// session with all of its players in one write.
    ///
    /// Every player must be a member of the group or a guest.
    #[instrument(skip(self, request), fields(game_id = %request.game_id))]
    pub async fn record_session(
        &self,
        group_id: &str,
        request: RecordSessionRequest,
    ) -> Result<SessionModel, AppError> {
        self.directory
            .find_group(group_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {}", group_id)))?;

        self.catalog
            .find_game(&request.game_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Game {}", request.game_id)))?;

        let template = match &request.template_id {
            Some(template_id) => {
                let template = self
                    .catalog
                    .find_template(template_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Template {}", template_id)))?;
                if template.game_id != request.game_id {
                    warn!(template_id, game_id = %request.game_id, "Template belongs to another game");
                    return Err(AppError::Validation(format!(
                        "Template {} does not belong to game {}",
                        template_id, request.game_id
                    )));
                }
                Some(template)
            }
            None => None,
        };

        for player in &request.players {
            let user_id = player.user_id();
            let user = self
                .directory
                .find_user(user_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))?;

            if !user.is_guest
                && self
                    .directory
                    .find_membership(group_id, user_id)
                    .await?
                    .is_none()
            {
                warn!(group_id, user_id, "Player is not a member of the group");
                return Err(AppError::Validation(format!(
                    "User {} is not a member of group {}",
                    user_id, group_id
                )));
            }
        }

        let scored = self
            .scorer
            .score(template.as_ref().map(|t| t.fields.as_slice()), &request.players)
            .map_err(|e| {
                warn!(error = %e, "Rejected session results");
                AppError::from(e)
            })?;
        debug!(
            players = scored.len(),
            policy = self.scorer.policy_name(),
            "Session scored"
        );

        let session = SessionModel::new(
            group_id.to_string(),
            request.game_id,
            request.template_id,
            request.played_at.unwrap_or_else(Utc::now),
            scored,
        );
        self.repository.create_session_with_players(&session).await?;

        info!(
            session_id = %session.id,
            group_id,
            players = session.player_count(),
            "Session recorded"
        );
        Ok(session)
    }
}
