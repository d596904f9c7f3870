//! Employee repository for database operations

use chrono::Utc;
use common::error::DatabaseResult;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use tracing::info;
use uuid::Uuid;

use super::{parse_enum, parse_permissions, parse_uuid, user::UserRepository};
use crate::models::{Employee, EmployeeFields, EmployeeWithPermissions, NewUser, User};

/// Employee repository
#[derive(Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    /// Create a new employee repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All employees, newest first, with the linked identity's stored permissions
    pub async fn list_with_permissions(&self) -> DatabaseResult<Vec<EmployeeWithPermissions>> {
        let rows = sqlx::query(
            r#"
            SELECT e.id, e.name, e.email, e.role, e.department, e.status, e.created_at,
                   u.permissions
            FROM employees e
            LEFT JOIN users u ON u.employee_id = e.id
            ORDER BY e.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> DatabaseResult<EmployeeWithPermissions> {
                Ok(EmployeeWithPermissions {
                    employee: employee_from_row(row)?,
                    permissions: parse_permissions(row.try_get("permissions")?)?
                        .unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Find an employee by ID
    pub async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Employee>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, role, department, status, created_at
            FROM employees
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(employee_from_row).transpose()
    }

    /// Create an employee record without a login
    pub async fn create(&self, fields: &EmployeeFields) -> DatabaseResult<Employee> {
        let employee = new_employee(fields);
        insert_employee(&self.pool, &employee).await?;

        info!("Created employee {}", employee.id);
        Ok(employee)
    }

    /// Create an employee record together with its linked identity.
    ///
    /// Both rows are written in one transaction; a duplicate username rolls
    /// the employee row back and surfaces as a conflict. `identity.employee_id`
    /// is overwritten with the new record's id.
    pub async fn provision(
        &self,
        fields: &EmployeeFields,
        mut identity: NewUser,
    ) -> DatabaseResult<(Employee, User)> {
        let employee = new_employee(fields);
        identity.employee_id = Some(employee.id);

        let mut tx = self.pool.begin().await?;
        insert_employee(&mut *tx, &employee).await?;
        let user = UserRepository::insert(&mut *tx, &identity).await?;
        tx.commit().await?;

        info!(
            "Provisioned employee {} with login {}",
            employee.id, user.username
        );
        Ok((employee, user))
    }

    /// Update an employee; returns `None` if it does not exist
    pub async fn update(
        &self,
        id: Uuid,
        fields: &EmployeeFields,
    ) -> DatabaseResult<Option<Employee>> {
        let result = sqlx::query(
            r#"
            UPDATE employees
            SET name = ?, email = ?, role = ?, department = ?, status = ?
            WHERE id = ?
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.email)
        .bind(&fields.role)
        .bind(&fields.department)
        .bind(fields.status.as_str())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    /// Delete an employee and its linked identity in one transaction.
    ///
    /// Returns false if the employee did not exist.
    pub async fn delete_with_identity(&self, id: Uuid) -> DatabaseResult<bool> {
        let mut tx = self.pool.begin().await?;

        let removed_users = sqlx::query("DELETE FROM users WHERE employee_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let removed = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        if removed > 0 {
            info!(
                "Deleted employee {} and {} linked login(s)",
                id, removed_users
            );
        }
        Ok(removed > 0)
    }

    /// Find an employee by email
    pub async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<Employee>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, role, department, status, created_at
            FROM employees
            WHERE email = ?
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(employee_from_row).transpose()
    }
}

fn new_employee(fields: &EmployeeFields) -> Employee {
    Employee {
        id: Uuid::new_v4(),
        name: fields.name.clone(),
        email: fields.email.clone(),
        role: fields.role.clone(),
        department: fields.department.clone(),
        status: fields.status,
        created_at: Utc::now(),
    }
}

async fn insert_employee<'e, E>(executor: E, employee: &Employee) -> DatabaseResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO employees (id, name, email, role, department, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee.id.to_string())
    .bind(&employee.name)
    .bind(&employee.email)
    .bind(&employee.role)
    .bind(&employee.department)
    .bind(employee.status.as_str())
    .bind(employee.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

fn employee_from_row(row: &SqliteRow) -> DatabaseResult<Employee> {
    Ok(Employee {
        id: parse_uuid(&row.try_get::<String, _>("id")?)?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        role: row.try_get("role")?,
        department: row.try_get("department")?,
        status: parse_enum(&row.try_get::<String, _>("status")?)?,
        created_at: row.try_get("created_at")?,
    })
}
