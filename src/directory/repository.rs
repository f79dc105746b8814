use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::str::FromStr;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{GroupMemberModel, GroupModel, GroupRole, UserModel};
use crate::shared::AppError;

/// Trait for user and group storage
#[async_trait]
pub trait DirectoryRepository {
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError>;
    async fn find_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError>;

    /// Stores the group together with its creator as first ADMIN, atomically
    async fn create_group_with_admin(
        &self,
        group: &GroupModel,
        admin: &GroupMemberModel,
    ) -> Result<(), AppError>;
    async fn find_group(&self, group_id: &str) -> Result<Option<GroupModel>, AppError>;

    async fn add_member(&self, member: &GroupMemberModel) -> Result<(), AppError>;
    async fn find_membership(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<Option<GroupMemberModel>, AppError>;
    async fn list_members(&self, group_id: &str) -> Result<Vec<GroupMemberModel>, AppError>;
}

#[derive(Default)]
struct DirectoryTables {
    users: HashMap<String, UserModel>,
    groups: HashMap<String, GroupModel>,
    members: Vec<GroupMemberModel>,
}

/// In-memory implementation of DirectoryRepository for development and testing
#[derive(Default)]
pub struct InMemoryDirectoryRepository {
    tables: RwLock<DirectoryTables>,
}

impl InMemoryDirectoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DirectoryRepository for InMemoryDirectoryRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, guest = user.is_guest, "Creating user in memory");

        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.id) {
            warn!(user_id = %user.id, "User already exists in memory");
            return Err(AppError::Conflict("User already exists".to_string()));
        }
        tables.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(user_id).cloned())
    }

    #[instrument(skip(self, group, admin))]
    async fn create_group_with_admin(
        &self,
        group: &GroupModel,
        admin: &GroupMemberModel,
    ) -> Result<(), AppError> {
        debug!(group_id = %group.id, admin = %admin.user_id, "Creating group in memory");

        let mut tables = self.tables.write().await;
        if tables.groups.contains_key(&group.id) {
            warn!(group_id = %group.id, "Group already exists in memory");
            return Err(AppError::Conflict("Group already exists".to_string()));
        }
        tables.groups.insert(group.id.clone(), group.clone());
        tables.members.push(admin.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_group(&self, group_id: &str) -> Result<Option<GroupModel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.get(group_id).cloned())
    }

    #[instrument(skip(self, member))]
    async fn add_member(&self, member: &GroupMemberModel) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if !tables.groups.contains_key(&member.group_id) {
            return Err(AppError::NotFound(format!("Group {}", member.group_id)));
        }
        if tables
            .members
            .iter()
            .any(|m| m.group_id == member.group_id && m.user_id == member.user_id)
        {
            warn!(group_id = %member.group_id, user_id = %member.user_id, "Already a member");
            return Err(AppError::Conflict("User is already a member".to_string()));
        }
        tables.members.push(member.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_membership(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<Option<GroupMemberModel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .members
            .iter()
            .find(|m| m.group_id == group_id && m.user_id == user_id)
            .cloned())
    }

    #[instrument(skip(self))]
    async fn list_members(&self, group_id: &str) -> Result<Vec<GroupMemberModel>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .members
            .iter()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect())
    }
}

/// PostgreSQL implementation of DirectoryRepository
pub struct PostgresDirectoryRepository {
    pool: PgPool,
}

impl PostgresDirectoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn member_from_row(row: &sqlx::postgres::PgRow) -> Result<GroupMemberModel, AppError> {
    let role: String = row.get("role");
    let role = GroupRole::from_str(&role)
        .map_err(|_| AppError::DatabaseError(format!("Unknown group role '{}'", role)))?;

    Ok(GroupMemberModel {
        group_id: row.get("group_id"),
        user_id: row.get("user_id"),
        role,
        joined_at: row.get("joined_at"),
    })
}

#[async_trait]
impl DirectoryRepository for PostgresDirectoryRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(user_id = %user.id, "Creating user in database");

        sqlx::query(
            "INSERT INTO users (id, display_name, email, is_guest, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&user.id)
        .bind(&user.display_name)
        .bind(&user.email)
        .bind(user.is_guest)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create user in database");
            AppError::from_sqlx(e)
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_user(&self, user_id: &str) -> Result<Option<UserModel>, AppError> {
        let row = sqlx::query(
            "SELECT id, display_name, email, is_guest, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %user_id, "Failed to fetch user from database");
            AppError::from_sqlx(e)
        })?;

        Ok(row.map(|row| UserModel {
            id: row.get("id"),
            display_name: row.get("display_name"),
            email: row.get("email"),
            is_guest: row.get("is_guest"),
            created_at: row.get("created_at"),
        }))
    }

    #[instrument(skip(self, group, admin))]
    async fn create_group_with_admin(
        &self,
        group: &GroupModel,
        admin: &GroupMemberModel,
    ) -> Result<(), AppError> {
        debug!(group_id = %group.id, "Creating group in database");

        let mut tx = self.pool.begin().await.map_err(AppError::from_sqlx)?;

        sqlx::query("INSERT INTO groups (id, name, created_at) VALUES ($1, $2, $3)")
            .bind(&group.id)
            .bind(&group.name)
            .bind(group.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, group_id = %group.id, "Failed to insert group");
                AppError::from_sqlx(e)
            })?;

        sqlx::query(
            "INSERT INTO group_members (group_id, user_id, role, joined_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&admin.group_id)
        .bind(&admin.user_id)
        .bind(admin.role.to_string())
        .bind(admin.joined_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            warn!(error = %e, group_id = %group.id, "Failed to insert group admin");
            AppError::from_sqlx(e)
        })?;

        tx.commit().await.map_err(AppError::from_sqlx)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_group(&self, group_id: &str) -> Result<Option<GroupModel>, AppError> {
        let row = sqlx::query("SELECT id, name, created_at FROM groups WHERE id = $1")
            .bind(group_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from_sqlx)?;

        Ok(row.map(|row| GroupModel {
            id: row.get("id"),
            name: row.get("name"),
            created_at: row.get("created_at"),
        }))
    }

    #[instrument(skip(self, member))]
    async fn add_member(&self, member: &GroupMemberModel) -> Result<(), AppError> {
        let result = sqlx::query(
            "INSERT INTO group_members (group_id, user_id, role, joined_at) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (group_id, user_id) DO NOTHING",
        )
        .bind(&member.group_id)
        .bind(&member.user_id)
        .bind(member.role.to_string())
        .bind(member.joined_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, group_id = %member.group_id, "Failed to add group member");
            AppError::from_sqlx(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("User is already a member".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_membership(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<Option<GroupMemberModel>, AppError> {
        let row = sqlx::query(
            "SELECT group_id, user_id, role, joined_at FROM group_members WHERE group_id = $1 AND user_id = $2",
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from_sqlx)?;

        row.as_ref().map(member_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn list_members(&self, group_id: &str) -> Result<Vec<GroupMemberModel>, AppError> {
        let rows = sqlx::query(
            "SELECT group_id, user_id, role, joined_at FROM group_members WHERE group_id = $1 ORDER BY joined_at",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from_sqlx)?;

        rows.iter().map(member_from_row).collect()
    }
}
