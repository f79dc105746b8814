use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::DirectoryService,
    types::{
        AddMemberRequest, CreateGroupRequest, CreateGuestRequest, GroupResponse, MemberResponse,
        RegisterUserRequest, RegisteredUserResponse, UserResponse,
    },
};
use crate::auth::AuthClaims;
use crate::shared::{ApiJson, AppError, AppState};

fn directory_service(state: &AppState) -> DirectoryService {
    DirectoryService::new(
        Arc::clone(&state.directory_repository),
        state.token_config.clone(),
    )
}

/// POST /users
#[instrument(name = "register_user", skip(state, request))]
pub async fn register_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterUserRequest>,
) -> Result<Json<RegisteredUserResponse>, AppError> {
    let registered = directory_service(&state).register_user(request).await?;
    info!(user_id = %registered.user.id, "User registration handled");
    Ok(Json(registered))
}

/// POST /guests
#[instrument(name = "create_guest", skip(state, request))]
pub async fn create_guest(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateGuestRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let guest = directory_service(&state).create_guest(request).await?;
    Ok(Json(guest))
}

/// POST /groups (authenticated)
#[instrument(name = "create_group", skip(state, claims, request))]
pub async fn create_group(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    ApiJson(request): ApiJson<CreateGroupRequest>,
) -> Result<Json<GroupResponse>, AppError> {
    let group = directory_service(&state)
        .create_group(&claims.user_id, request)
        .await?;
    Ok(Json(group))
}

/// POST /groups/:group_id/members (authenticated, group admins only)
#[instrument(name = "add_member", skip(state, claims, request))]
pub async fn add_member(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Extension(claims): Extension<AuthClaims>,
    ApiJson(request): ApiJson<AddMemberRequest>,
) -> Result<Json<MemberResponse>, AppError> {
    let member = directory_service(&state)
        .add_member(&group_id, &claims.user_id, request)
        .await?;
    Ok(Json(member))
}

/// GET /groups/:group_id/members
#[instrument(name = "list_members", skip(state))]
pub async fn list_members(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<MemberResponse>>, AppError> {
    Ok(Json(directory_service(&state).list_members(&group_id).await?))
}
