use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::{
    models::{LeaderboardEntry, StatisticsSummary},
    service::StatsService,
};
use crate::shared::{AppError, AppState};

fn stats_service(state: &AppState) -> StatsService {
    StatsService::new(
        Arc::clone(&state.directory_repository),
        Arc::clone(&state.catalog_repository),
        Arc::clone(&state.session_repository),
    )
}

/// GET /groups/:group_id/leaderboard
#[instrument(name = "get_leaderboard", skip(state))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    Ok(Json(stats_service(&state).get_leaderboard(&group_id).await?))
}

/// GET /users/:user_id/statistics
#[instrument(name = "get_user_statistics", skip(state))]
pub async fn get_user_statistics(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<StatisticsSummary>, AppError> {
    Ok(Json(
        stats_service(&state).get_user_statistics(&user_id).await?,
    ))
}
