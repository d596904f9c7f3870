//! Leave request repository for database operations

use chrono::{NaiveDate, Utc};
use common::error::DatabaseResult;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use tracing::info;
use uuid::Uuid;

use super::{parse_enum, parse_uuid};
use crate::models::{LeaveRequest, LeaveStatus};

const SELECT_WITH_NAME: &str = r#"
    SELECT l.id, l.employee_id, e.name AS employee_name, l.start_date, l.end_date,
           l.reason, l.status, l.created_at
    FROM leave_requests l
    LEFT JOIN employees e ON e.id = l.employee_id
"#;

/// Leave request creation payload
#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub employee_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
}

/// Leave request repository
#[derive(Clone)]
pub struct LeaveRepository {
    pool: SqlitePool,
}

impl LeaveRepository {
    /// Create a new leave repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All requests, newest first
    pub async fn list_all(&self) -> DatabaseResult<Vec<LeaveRequest>> {
        let query = format!("{} ORDER BY l.created_at DESC", SELECT_WITH_NAME);
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        rows.iter().map(request_from_row).collect()
    }

    /// Requests filed by one employee, newest first
    pub async fn list_for_employee(&self, employee_id: Uuid) -> DatabaseResult<Vec<LeaveRequest>> {
        let query = format!(
            "{} WHERE l.employee_id = ? ORDER BY l.created_at DESC",
            SELECT_WITH_NAME
        );
        let rows = sqlx::query(&query)
            .bind(employee_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(request_from_row).collect()
    }

    pub async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<LeaveRequest>> {
        let query = format!("{} WHERE l.id = ?", SELECT_WITH_NAME);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(request_from_row).transpose()
    }

    pub async fn create(&self, request: &NewLeaveRequest) -> DatabaseResult<LeaveRequest> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO leave_requests (id, employee_id, start_date, end_date, reason, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(request.employee_id.to_string())
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(&request.reason)
        .bind(request.status.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!(
            "Leave request {} filed for employee {}",
            id, request.employee_id
        );

        self.find_by_id(id)
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound.into())
    }

    /// Update a request; returns `None` if it does not exist
    pub async fn update(
        &self,
        id: Uuid,
        request: &NewLeaveRequest,
    ) -> DatabaseResult<Option<LeaveRequest>> {
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET employee_id = ?, start_date = ?, end_date = ?, reason = ?, status = ?
            WHERE id = ?
            "#,
        )
        .bind(request.employee_id.to_string())
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(&request.reason)
        .bind(request.status.as_str())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    pub async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM leave_requests WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Withdraw a request only while it is still pending and owned by `employee_id`.
    ///
    /// The conditions are repeated in the statement so that a decision taken
    /// between the ownership check and the delete is not overridden.
    pub async fn delete_pending_owned(&self, id: Uuid, employee_id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query(
            "DELETE FROM leave_requests WHERE id = ? AND employee_id = ? AND status = ?",
        )
        .bind(id.to_string())
        .bind(employee_id.to_string())
        .bind(LeaveStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn request_from_row(row: &SqliteRow) -> DatabaseResult<LeaveRequest> {
    Ok(LeaveRequest {
        id: parse_uuid(&row.try_get::<String, _>("id")?)?,
        employee_id: parse_uuid(&row.try_get::<String, _>("employee_id")?)?,
        employee_name: row.try_get("employee_name")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        reason: row.try_get("reason")?,
        status: parse_enum(&row.try_get::<String, _>("status")?)?,
        created_at: row.try_get("created_at")?,
    })
}
