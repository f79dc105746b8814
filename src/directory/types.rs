use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{GroupMemberModel, GroupModel, GroupRole, UserModel};

/// Request payload for registering a user with a login
#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub display_name: String,
    pub email: Option<String>,
}

/// Request payload for creating a guest
#[derive(Debug, Default, Deserialize)]
pub struct CreateGuestRequest {
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: String,
    #[serde(default)]
    pub role: Option<GroupRole>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub is_guest: bool,
}

impl From<UserModel> for UserResponse {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            display_name: user.display_name,
            email: user.email,
            is_guest: user.is_guest,
        }
    }
}

/// Response for registration: the user plus a bearer token
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisteredUserResponse {
    pub user: UserResponse,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupResponse {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<GroupModel> for GroupResponse {
    fn from(group: GroupModel) -> Self {
        Self {
            id: group.id,
            name: group.name,
            created_at: group.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MemberResponse {
    pub group_id: String,
    pub user_id: String,
    pub role: GroupRole,
}

impl From<GroupMemberModel> for MemberResponse {
    fn from(member: GroupMemberModel) -> Self {
        Self {
            group_id: member.group_id,
            user_id: member.user_id,
            role: member.role,
        }
    }
}
