use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

/// Database model for users table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserModel {
    pub id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub is_guest: bool, // Guests have no login and only appear in sessions
    pub created_at: DateTime<Utc>,
}

impl UserModel {
    pub fn new(display_name: String, email: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            display_name,
            email,
            is_guest: false,
            created_at: Utc::now(),
        }
    }

    /// Creates a guest; a pet name is generated when no display name is given
    pub fn guest(display_name: Option<String>) -> Self {
        let display_name = display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| petname::Petnames::default().generate_one(2, "-"));

        Self {
            id: Uuid::new_v4().to_string(),
            display_name,
            email: None,
            is_guest: true,
            created_at: Utc::now(),
        }
    }
}

/// Database model for groups table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupModel {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl GroupModel {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupRole {
    Admin,
    Member,
}

/// Database model for group_members table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupMemberModel {
    pub group_id: String,
    pub user_id: String,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

impl GroupMemberModel {
    pub fn new(group_id: String, user_id: String, role: GroupRole) -> Self {
        Self {
            group_id,
            user_id,
            role,
            joined_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == GroupRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn new_user_is_not_a_guest() {
        let user = UserModel::new("Ada".to_string(), Some("ada@example.com".to_string()));
        assert!(!user.is_guest);
        assert!(!user.id.is_empty());
    }

    #[test]
    fn guest_gets_generated_name_when_blank() {
        let named = UserModel::guest(Some("Uncle Bob".to_string()));
        assert_eq!(named.display_name, "Uncle Bob");
        assert!(named.is_guest);

        let generated = UserModel::guest(Some("   ".to_string()));
        assert!(generated.display_name.contains('-'));
        assert!(generated.email.is_none());
    }

    #[test]
    fn group_roles_round_trip_through_strings() {
        assert_eq!(GroupRole::Admin.to_string(), "ADMIN");
        assert_eq!(GroupRole::from_str("MEMBER"), Ok(GroupRole::Member));
        assert!(GroupRole::from_str("OWNER").is_err());
    }
}
