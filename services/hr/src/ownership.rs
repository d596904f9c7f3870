//! Self-ownership policy for employee-initiated mutations

use tracing::warn;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    jwt::Claims,
    models::{LeaveRequest, LeaveStatus},
};

/// A record that belongs to one employee and may be locked against changes
pub trait OwnedResource {
    /// Employee record the resource belongs to
    fn owner(&self) -> Uuid;

    /// Whether the owner may still change or withdraw it
    fn is_mutable(&self) -> bool;
}

impl OwnedResource for LeaveRequest {
    fn owner(&self) -> Uuid {
        self.employee_id
    }

    fn is_mutable(&self) -> bool {
        self.status == LeaveStatus::Pending
    }
}

/// Allow the caller to mutate `resource` only if it exists, belongs to the
/// caller's employee record and is still mutable.
pub fn authorize_mutation<R: OwnedResource>(claims: &Claims, resource: Option<R>) -> AppResult<R> {
    let resource = resource.ok_or_else(|| AppError::not_found("Not found"))?;

    if claims.employee_id != Some(resource.owner()) {
        warn!("User {} attempted to modify a record it does not own", claims.sub);
        return Err(AppError::Forbidden);
    }

    if !resource.is_mutable() {
        warn!("User {} attempted to modify a locked record", claims.sub);
        return Err(AppError::Forbidden);
    }

    Ok(resource)
}
