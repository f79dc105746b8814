use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{SessionModel, SessionPlayerRecord};
use crate::shared::AppError;

/// Trait for recorded sessions
#[async_trait]
pub trait SessionRepository {
    /// Stores the session and all of its players as one unit. Readers never
    /// observe a session with only some of its players.
    async fn create_session_with_players(&self, session: &SessionModel) -> Result<(), AppError>;

    async fn find_session_players_by_group(
        &self,
        group_id: &str,
    ) -> Result<Vec<SessionPlayerRecord>, AppError>;

    async fn find_session_players_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<SessionPlayerRecord>, AppError>;

    async fn count_sessions_for_game(&self, game_id: &str) -> Result<i64, AppError>;
}

/// In-memory implementation of SessionRepository for development and testing
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<Vec<SessionModel>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn records_where<F>(&self, keep: F) -> Vec<SessionPlayerRecord>
    where
        F: Fn(&SessionModel, &str) -> bool,
    {
        let keep = &keep;
        let sessions = self.sessions.read().await;
        sessions
            .iter()
            .flat_map(|session| {
                session
                    .players
                    .iter()
                    .filter(move |player| keep(session, player.user_id.as_str()))
                    .map(move |player| SessionPlayerRecord::from_session(session, player))
            })
            .collect()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    #[instrument(skip(self, session))]
    async fn create_session_with_players(&self, session: &SessionModel) -> Result<(), AppError> {
        debug!(
            session_id = %session.id,
            group_id = %session.group_id,
            players = session.player_count(),
            "Storing session in memory"
        );

        let mut sessions = self.sessions.write().await;
        if sessions.iter().any(|s| s.id == session.id) {
            warn!(session_id = %session.id, "Session already exists in memory");
            return Err(AppError::Integrity("Session already exists".to_string()));
        }
        sessions.push(session.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_session_players_by_group(
        &self,
        group_id: &str,
    ) -> Result<Vec<SessionPlayerRecord>, AppError> {
        Ok(self
            .records_where(|session, _| session.group_id == group_id)
            .await)
    }

    #[instrument(skip(self))]
    async fn find_session_players_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<SessionPlayerRecord>, AppError> {
        Ok(self
            .records_where(|_, player_user_id| player_user_id == user_id)
            .await)
    }

    #[instrument(skip(self))]
    async fn count_sessions_for_game(&self, game_id: &str) -> Result<i64, AppError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.iter().filter(|s| s.game_id == game_id).count() as i64)
    }
}

/// PostgreSQL implementation of SessionRepository
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SESSION_PLAYER_RECORD_SELECT: &str = "\
    SELECT s.id AS session_id, s.group_id, s.game_id, sp.user_id, sp.raw_score, sp.placement, \
           sp.points_awarded, \
           (SELECT COUNT(*) FROM session_players c WHERE c.session_id = s.id)::INT AS player_count, \
           s.played_at \
      FROM session_players sp \
      JOIN sessions s ON s.id = sp.session_id";

/// Anything but an unreachable store is reported as an integrity failure:
/// the transaction has been rolled back and nothing was written.
fn write_error(error: sqlx::Error) -> AppError {
    match AppError::from_sqlx(error) {
        AppError::DatabaseError(msg) => AppError::Integrity(msg),
        other => other,
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    #[instrument(skip(self, session))]
    async fn create_session_with_players(&self, session: &SessionModel) -> Result<(), AppError> {
        debug!(session_id = %session.id, players = session.player_count(), "Storing session in database");

        let mut tx = self.pool.begin().await.map_err(AppError::from_sqlx)?;

        // Dropping `tx` on an early return rolls the transaction back
        sqlx::query(
            "INSERT INTO sessions (id, group_id, game_id, template_id, played_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&session.id)
        .bind(&session.group_id)
        .bind(&session.game_id)
        .bind(&session.template_id)
        .bind(session.played_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            warn!(error = %e, session_id = %session.id, "Failed to insert session");
            write_error(e)
        })?;

        for (position, player) in session.players.iter().enumerate() {
            sqlx::query(
                "INSERT INTO session_players \
                 (id, session_id, user_id, position, raw_score, placement, points_awarded, score_details) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(&player.id)
            .bind(&session.id)
            .bind(&player.user_id)
            .bind(position as i32)
            .bind(player.raw_score)
            .bind(player.placement)
            .bind(player.points_awarded)
            .bind(player.score_details.as_ref().map(Json))
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, session_id = %session.id, user_id = %player.user_id, "Failed to insert session player");
                write_error(e)
            })?;
        }

        tx.commit().await.map_err(write_error)?;

        debug!(session_id = %session.id, "Session stored in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_session_players_by_group(
        &self,
        group_id: &str,
    ) -> Result<Vec<SessionPlayerRecord>, AppError> {
        let query = format!(
            "{} WHERE s.group_id = $1 ORDER BY s.played_at, s.id, sp.position",
            SESSION_PLAYER_RECORD_SELECT
        );

        sqlx::query_as::<_, SessionPlayerRecord>(&query)
            .bind(group_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, group_id, "Failed to load group session players");
                AppError::from_sqlx(e)
            })
    }

    #[instrument(skip(self))]
    async fn find_session_players_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<SessionPlayerRecord>, AppError> {
        let query = format!(
            "{} WHERE sp.user_id = $1 ORDER BY s.played_at, s.id",
            SESSION_PLAYER_RECORD_SELECT
        );

        sqlx::query_as::<_, SessionPlayerRecord>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, user_id, "Failed to load user session players");
                AppError::from_sqlx(e)
            })
    }

    #[instrument(skip(self))]
    async fn count_sessions_for_game(&self, game_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sessions WHERE game_id = $1")
            .bind(game_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from_sqlx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoredPlayer;
    use chrono::Utc;

    fn session(group_id: &str, game_id: &str, players: &[(&str, i32, i32)]) -> SessionModel {
        SessionModel::new(
            group_id.to_string(),
            game_id.to_string(),
            None,
            Utc::now(),
            players
                .iter()
                .map(|(user_id, placement, points)| ScoredPlayer {
                    user_id: user_id.to_string(),
                    raw_score: 0,
                    placement: *placement,
                    points_awarded: *points,
                    score_details: None,
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn stores_sessions_with_all_players() {
        let repo = InMemorySessionRepository::new();
        repo.create_session_with_players(&session("g1", "azul", &[("ada", 1, 2), ("bob", 2, 1)]))
            .await
            .unwrap();

        let records = repo.find_session_players_by_group("g1").await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.player_count == 2));
        assert_eq!(repo.session_count().await, 1);
    }

    #[tokio::test]
    async fn rejects_duplicate_session_ids() {
        let repo = InMemorySessionRepository::new();
        let recorded = session("g1", "azul", &[("ada", 1, 1)]);
        repo.create_session_with_players(&recorded).await.unwrap();

        assert!(matches!(
            repo.create_session_with_players(&recorded).await,
            Err(AppError::Integrity(_))
        ));
        assert_eq!(repo.session_count().await, 1);
    }

    #[tokio::test]
    async fn filters_by_group_and_user() {
        let repo = InMemorySessionRepository::new();
        repo.create_session_with_players(&session("g1", "azul", &[("ada", 1, 2), ("bob", 2, 1)]))
            .await
            .unwrap();
        repo.create_session_with_players(&session("g2", "azul", &[("ada", 2, 1), ("cy", 1, 2)]))
            .await
            .unwrap();

        let ada = repo.find_session_players_by_user("ada").await.unwrap();
        assert_eq!(ada.len(), 2);
        assert!(ada.iter().all(|r| r.user_id == "ada"));

        let g2 = repo.find_session_players_by_group("g2").await.unwrap();
        assert_eq!(g2.len(), 2);
        assert!(repo.find_session_players_by_group("g3").await.unwrap().is_empty());

        assert_eq!(repo.count_sessions_for_game("azul").await.unwrap(), 2);
        assert_eq!(repo.count_sessions_for_game("catan").await.unwrap(), 0);
    }
}
