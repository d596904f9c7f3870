//! Attendance repository for database operations

use chrono::{NaiveDate, Utc};
use common::error::DatabaseResult;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::parse_uuid;
use crate::models::AttendanceRecord;

const SELECT_WITH_NAME: &str = r#"
    SELECT a.id, a.employee_id, e.name AS employee_name, a.date, a.status, a.created_at
    FROM attendance a
    LEFT JOIN employees e ON e.id = a.employee_id
"#;

/// Attendance repository
#[derive(Clone)]
pub struct AttendanceRepository {
    pool: SqlitePool,
}

impl AttendanceRepository {
    /// Create a new attendance repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All records, newest first
    pub async fn list_all(&self) -> DatabaseResult<Vec<AttendanceRecord>> {
        let query = format!("{} ORDER BY a.created_at DESC", SELECT_WITH_NAME);
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        rows.iter().map(record_from_row).collect()
    }

    /// Records of one employee, most recent day first
    pub async fn list_for_employee(
        &self,
        employee_id: Uuid,
    ) -> DatabaseResult<Vec<AttendanceRecord>> {
        let query = format!(
            "{} WHERE a.employee_id = ? ORDER BY a.date DESC, a.created_at DESC",
            SELECT_WITH_NAME
        );
        let rows = sqlx::query(&query)
            .bind(employee_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(record_from_row).collect()
    }

    pub async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<AttendanceRecord>> {
        let query = format!("{} WHERE a.id = ?", SELECT_WITH_NAME);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(record_from_row).transpose()
    }

    /// Record attendance for an employee
    pub async fn create(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
        status: &str,
    ) -> DatabaseResult<AttendanceRecord> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO attendance (id, employee_id, date, status, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(employee_id.to_string())
        .bind(date)
        .bind(status)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound.into())
    }

    /// Update a record; returns `None` if it does not exist
    pub async fn update(
        &self,
        id: Uuid,
        employee_id: Uuid,
        date: NaiveDate,
        status: &str,
    ) -> DatabaseResult<Option<AttendanceRecord>> {
        let result = sqlx::query(
            "UPDATE attendance SET employee_id = ?, date = ?, status = ? WHERE id = ?",
        )
        .bind(employee_id.to_string())
        .bind(date)
        .bind(status)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    pub async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn record_from_row(row: &SqliteRow) -> DatabaseResult<AttendanceRecord> {
    Ok(AttendanceRecord {
        id: parse_uuid(&row.try_get::<String, _>("id")?)?,
        employee_id: parse_uuid(&row.try_get::<String, _>("employee_id")?)?,
        employee_name: row.try_get("employee_name")?,
        date: row.try_get("date")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
    })
}
