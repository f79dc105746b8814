use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::{
    service::SessionService,
    types::{RecordSessionRequest, SessionResponse},
};
use crate::auth::AuthClaims;
use crate::directory::DirectoryService;
use crate::shared::{ApiJson, AppError, AppState};

/// POST /groups/:group_id/sessions (authenticated, group members only)
#[instrument(name = "record_session", skip(state, claims, request))]
pub async fn record_session(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Extension(claims): Extension<AuthClaims>,
    ApiJson(request): ApiJson<RecordSessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let directory = DirectoryService::new(
        Arc::clone(&state.directory_repository),
        state.token_config.clone(),
    );
    directory.get_group(&group_id).await?;
    directory.require_member(&group_id, &claims.user_id).await?;

    let service = SessionService::new(
        Arc::clone(&state.directory_repository),
        Arc::clone(&state.catalog_repository),
        Arc::clone(&state.session_repository),
        state.scorer.clone(),
    );
    let session = service.record_session(&group_id, request).await?;
    Ok(Json(session.into()))
}
