//! Attendance record model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Attendance entry owned by an employee record
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub employee_id: Uuid,
    /// Name of the owning employee, joined in on reads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,
    pub date: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Attendance create/update payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceInput {
    pub employee_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub status: Option<String>,
}
