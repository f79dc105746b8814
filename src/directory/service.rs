use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{GroupMemberModel, GroupModel, GroupRole, UserModel},
    repository::DirectoryRepository,
    types::{
        AddMemberRequest, CreateGroupRequest, CreateGuestRequest, GroupResponse, MemberResponse,
        RegisterUserRequest, RegisteredUserResponse, UserResponse,
    },
};
use crate::{auth::TokenConfig, shared::AppError};

/// Service for users, guests and group membership
pub struct DirectoryService {
    repository: Arc<dyn DirectoryRepository + Send + Sync>,
    token_config: TokenConfig,
}

impl DirectoryService {
    pub fn new(
        repository: Arc<dyn DirectoryRepository + Send + Sync>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            repository,
            token_config,
        }
    }

    /// Registers a user with a login and issues a bearer token
    #[instrument(skip(self, request))]
    pub async fn register_user(
        &self,
        request: RegisterUserRequest,
    ) -> Result<RegisteredUserResponse, AppError> {
        let display_name = required_name(&request.display_name, "display_name")?;

        let email = request
            .email
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty());
        if let Some(email) = &email {
            if !email.contains('@') {
                return Err(AppError::Validation(format!("Invalid email '{}'", email)));
            }
        }

        let user = UserModel::new(display_name, email);
        self.repository.create_user(&user).await?;

        let token = self
            .token_config
            .create_token(user.id.clone(), user.display_name.clone())?;

        info!(user_id = %user.id, "User registered");
        Ok(RegisteredUserResponse {
            user: user.into(),
            token,
        })
    }

    #[instrument(skip(self, request))]
    pub async fn create_guest(&self, request: CreateGuestRequest) -> Result<UserResponse, AppError> {
        let guest = UserModel::guest(request.display_name);
        self.repository.create_user(&guest).await?;

        info!(user_id = %guest.id, display_name = %guest.display_name, "Guest created");
        Ok(guest.into())
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: &str) -> Result<UserModel, AppError> {
        self.repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))
    }

    #[instrument(skip(self))]
    pub async fn get_group(&self, group_id: &str) -> Result<GroupModel, AppError> {
        self.repository
            .find_group(group_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {}", group_id)))
    }

    /// Creates a group with `creator_id` as its first ADMIN
    #[instrument(skip(self, request))]
    pub async fn create_group(
        &self,
        creator_id: &str,
        request: CreateGroupRequest,
    ) -> Result<GroupResponse, AppError> {
        let name = required_name(&request.name, "name")?;
        let creator = self.get_user(creator_id).await?;

        let group = GroupModel::new(name);
        let admin = GroupMemberModel::new(group.id.clone(), creator.id, GroupRole::Admin);
        self.repository.create_group_with_admin(&group, &admin).await?;

        info!(group_id = %group.id, admin = %admin.user_id, "Group created");
        Ok(group.into())
    }

    /// Adds a user to a group. Only group admins may do this.
    #[instrument(skip(self, request))]
    pub async fn add_member(
        &self,
        group_id: &str,
        actor_id: &str,
        request: AddMemberRequest,
    ) -> Result<MemberResponse, AppError> {
        self.get_group(group_id).await?;

        let actor = self.require_member(group_id, actor_id).await?;
        if !actor.is_admin() {
            warn!(group_id, actor_id, "Non-admin tried to add a member");
            return Err(AppError::Forbidden(
                "Only group admins can add members".to_string(),
            ));
        }

        let user = self.get_user(&request.user_id).await?;
        let member = GroupMemberModel::new(
            group_id.to_string(),
            user.id,
            request.role.unwrap_or(GroupRole::Member),
        );
        self.repository.add_member(&member).await?;

        info!(group_id, user_id = %member.user_id, role = %member.role, "Member added");
        Ok(member.into())
    }

    #[instrument(skip(self))]
    pub async fn list_members(&self, group_id: &str) -> Result<Vec<MemberResponse>, AppError> {
        self.get_group(group_id).await?;
        let members = self.repository.list_members(group_id).await?;
        Ok(members.into_iter().map(Into::into).collect())
    }

    /// Returns the membership of `user_id` in `group_id`, or Forbidden
    #[instrument(skip(self))]
    pub async fn require_member(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<GroupMemberModel, AppError> {
        self.repository
            .find_membership(group_id, user_id)
            .await?
            .ok_or_else(|| {
                warn!(group_id, user_id, "User is not a group member");
                AppError::Forbidden("Not a member of this group".to_string())
            })
    }
}

fn required_name(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} cannot be empty", field)));
    }
    Ok(trimmed.to_string())
}
