//! Repositories for database operations
//!
//! Identifiers are stored as text and timestamps as RFC 3339 strings.

use common::error::{DatabaseError, DatabaseResult};
use uuid::Uuid;

use crate::permissions::PermissionSet;

pub mod attendance;
pub mod employee;
pub mod leave;
pub mod settings;
pub mod user;

pub use attendance::AttendanceRepository;
pub use employee::EmployeeRepository;
pub use leave::{LeaveRepository, NewLeaveRequest};
pub use settings::SettingsRepository;
pub use user::{CredentialStore, UserRepository};

pub(crate) fn parse_uuid(value: &str) -> DatabaseResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| DatabaseError::Decode(format!("invalid id {}: {}", value, e)))
}

pub(crate) fn parse_optional_uuid(value: Option<String>) -> DatabaseResult<Option<Uuid>> {
    value.as_deref().map(parse_uuid).transpose()
}

/// Decode the JSON permissions column; `NULL` stays `None`
pub(crate) fn parse_permissions(value: Option<String>) -> DatabaseResult<Option<PermissionSet>> {
    value
        .map(|raw| {
            serde_json::from_str(&raw)
                .map_err(|e| DatabaseError::Decode(format!("invalid permissions: {}", e)))
        })
        .transpose()
}

pub(crate) fn encode_permissions(permissions: &PermissionSet) -> DatabaseResult<String> {
    serde_json::to_string(permissions)
        .map_err(|e| DatabaseError::Decode(format!("unencodable permissions: {}", e)))
}

pub(crate) fn parse_enum<T: std::str::FromStr<Err = String>>(value: &str) -> DatabaseResult<T> {
    value.parse().map_err(DatabaseError::Decode)
}
