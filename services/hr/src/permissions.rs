//! Permission sets and the login-time permission resolver
//!
//! A permission set maps permission names to explicit grants. Employees get
//! a default set which stored overrides refine; administrators bypass named
//! permission checks entirely, so their stored set is passed through as-is.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use common::error::DatabaseResult;

use crate::{
    models::{Role, User},
    repositories::CredentialStore,
};

/// View own attendance records
pub const ATTENDANCE_VIEW: &str = "attendance_view";
/// File and withdraw own leave requests
pub const LEAVE_APPLY: &str = "leave_apply";
/// View own employee profile
pub const PROFILE_VIEW: &str = "profile_view";

/// Permissions granted to every employee unless explicitly revoked
pub const DEFAULT_EMPLOYEE_PERMISSIONS: &[&str] = &[ATTENDANCE_VIEW, LEAVE_APPLY, PROFILE_VIEW];

/// Mapping from permission name to grant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeMap<String, bool>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The baseline every employee starts from
    pub fn employee_defaults() -> Self {
        DEFAULT_EMPLOYEE_PERMISSIONS
            .iter()
            .map(|name| (name.to_string(), true))
            .collect()
    }

    /// Whether `name` is explicitly granted. Unknown names are denied.
    pub fn grants(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }

    pub fn set(&mut self, name: impl Into<String>, granted: bool) {
        self.0.insert(name.into(), granted);
    }

    /// Overlay `overrides` on top of `self`; on conflicting keys the override wins.
    pub fn merge(mut self, overrides: &PermissionSet) -> Self {
        for (name, granted) in &overrides.0 {
            self.0.insert(name.clone(), *granted);
        }
        self
    }
}

impl FromIterator<(String, bool)> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Effective permission set for `user`, computed without touching the store
pub fn resolve(user: &User) -> PermissionSet {
    match user.role {
        Role::Admin => user.permissions.clone().unwrap_or_default(),
        Role::Employee => match &user.permissions {
            Some(stored) => PermissionSet::employee_defaults().merge(stored),
            None => PermissionSet::employee_defaults(),
        },
    }
}

/// Resolve the effective set and persist it for employees that have none stored.
///
/// The write is conditional on the stored value still being absent, so
/// concurrent first logins write the same baseline at most once and an
/// explicit empty set is never replaced.
pub async fn resolve_and_backfill(
    store: &dyn CredentialStore,
    user: &User,
) -> DatabaseResult<PermissionSet> {
    let effective = resolve(user);

    if user.role == Role::Employee && user.permissions.is_none() {
        if store.backfill_permissions(user.id, &effective).await? {
            info!("Materialized default permissions for user {}", user.id);
        }
    }

    Ok(effective)
}
