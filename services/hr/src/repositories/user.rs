//! User repository for database operations
//!
//! [`CredentialStore`] is the narrow view of the users table the
//! authenticator and the permission resolver depend on.

use async_trait::async_trait;
use chrono::Utc;
use common::error::DatabaseResult;
use sqlx::{Executor, Row, Sqlite, SqlitePool, sqlite::SqliteRow};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use super::{encode_permissions, parse_enum, parse_optional_uuid, parse_permissions, parse_uuid};
use crate::{
    models::{NewUser, Role, User},
    permissions::PermissionSet,
};

const USER_COLUMNS: &str = "id, username, password_hash, role, employee_id, permissions, created_at";

/// Lookup and update operations on identities
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>>;

    /// Returns false if the user does not exist
    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> DatabaseResult<bool>;

    /// Store `permissions` only if the user has none stored yet.
    ///
    /// Returns whether a write happened.
    async fn backfill_permissions(
        &self,
        id: Uuid,
        permissions: &PermissionSet,
    ) -> DatabaseResult<bool>;
}

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        Self::insert(&self.pool, new_user).await
    }

    /// Insert a user through any executor, so callers can enlist it in a transaction
    pub(crate) async fn insert<'e, E>(executor: E, new_user: &NewUser) -> DatabaseResult<User>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        info!("Creating new user: {}", new_user.username);

        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username.clone(),
            password_hash: new_user.password_hash.clone(),
            role: new_user.role,
            employee_id: new_user.employee_id,
            permissions: new_user.permissions.clone(),
            created_at: Utc::now(),
        };

        let permissions = user.permissions.as_ref().map(encode_permissions).transpose()?;

        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, role, employee_id, permissions, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.employee_id.map(|id| id.to_string()))
        .bind(permissions)
        .bind(user.created_at)
        .execute(executor)
        .await?;

        Ok(user)
    }

    /// Force the role of an existing user
    pub async fn set_role(&self, username: &str, role: Role) -> DatabaseResult<bool> {
        let result = sqlx::query("UPDATE users SET role = ? WHERE username = ?")
            .bind(role.as_str())
            .bind(username)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Set the role and employee link of an identity in one write
    pub async fn assign_role(
        &self,
        id: Uuid,
        role: Role,
        employee_id: Option<Uuid>,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query("UPDATE users SET role = ?, employee_id = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(employee_id.map(|id| id.to_string()))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        info!("Assigned role {} to user {}", role, id);
        Ok(result.rows_affected() > 0)
    }

    /// Replace the stored permission set of the identity linked to an employee
    pub async fn replace_permissions_for_employee(
        &self,
        employee_id: Uuid,
        permissions: &PermissionSet,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query("UPDATE users SET permissions = ? WHERE employee_id = ?")
            .bind(encode_permissions(permissions)?)
            .bind(employee_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stored permission sets keyed by linked employee
    pub async fn permissions_by_employee(&self) -> DatabaseResult<HashMap<Uuid, PermissionSet>> {
        let rows = sqlx::query(
            "SELECT employee_id, permissions FROM users WHERE employee_id IS NOT NULL",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_employee = HashMap::with_capacity(rows.len());
        for row in rows {
            let employee_id = parse_uuid(&row.try_get::<String, _>("employee_id")?)?;
            let permissions = parse_permissions(row.try_get("permissions")?)?.unwrap_or_default();
            by_employee.insert(employee_id, permissions);
        }

        Ok(by_employee)
    }

    /// One-time migration: give every employee identity without a stored
    /// permission set the default baseline. Returns the number of rows written.
    pub async fn backfill_default_permissions(&self) -> DatabaseResult<u64> {
        let result = sqlx::query(
            "UPDATE users SET permissions = ? WHERE role = ? AND permissions IS NULL",
        )
        .bind(encode_permissions(&PermissionSet::employee_defaults())?)
        .bind(Role::Employee.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn find_one(&self, column: &str, value: String) -> DatabaseResult<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE {} = ?", USER_COLUMNS, column);
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }
}

#[async_trait]
impl CredentialStore for UserRepository {
    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        self.find_one("username", username.to_string()).await
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        self.find_one("id", id.to_string()).await
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> DatabaseResult<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn backfill_permissions(
        &self,
        id: Uuid,
        permissions: &PermissionSet,
    ) -> DatabaseResult<bool> {
        let result =
            sqlx::query("UPDATE users SET permissions = ? WHERE id = ? AND permissions IS NULL")
                .bind(encode_permissions(permissions)?)
                .bind(id.to_string())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn user_from_row(row: &SqliteRow) -> DatabaseResult<User> {
    Ok(User {
        id: parse_uuid(&row.try_get::<String, _>("id")?)?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        role: parse_enum(&row.try_get::<String, _>("role")?)?,
        employee_id: parse_optional_uuid(row.try_get("employee_id")?)?,
        permissions: parse_permissions(row.try_get("permissions")?)?,
        created_at: row.try_get("created_at")?,
    })
}
