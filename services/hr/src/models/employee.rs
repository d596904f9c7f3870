//! Employee record model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::permissions::PermissionSet;

/// Employment status of an HR profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "Active",
            EmployeeStatus::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmployeeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(EmployeeStatus::Active),
            "inactive" => Ok(EmployeeStatus::Inactive),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }
}

/// Employee entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Job title, unrelated to the login role
    pub role: String,
    pub department: String,
    pub status: EmployeeStatus,
    pub created_at: DateTime<Utc>,
}

/// Employee listing row, enriched with the linked identity's stored permissions
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeWithPermissions {
    #[serde(flatten)]
    pub employee: Employee,
    pub permissions: PermissionSet,
}

/// Validated employee attributes
#[derive(Debug, Clone)]
pub struct EmployeeFields {
    pub name: String,
    pub email: String,
    pub role: String,
    pub department: String,
    pub status: EmployeeStatus,
}

/// Employee creation payload; `username` and `password` provision a login
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateEmployeeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub status: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub permissions: Option<PermissionSet>,
}

/// Employee update payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEmployeeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub status: Option<String>,
    pub permissions: Option<PermissionSet>,
}
