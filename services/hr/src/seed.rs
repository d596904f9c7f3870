//! Start-up seeding and data migrations

use tracing::info;

use crate::{
    error::AppResult,
    models::{EmployeeFields, EmployeeStatus, NewUser, Role},
    password,
    repositories::CredentialStore,
    state::AppState,
};

const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "admin";
const EMPLOYEE_USERNAME: &str = "employee1";
const EMPLOYEE_PASSWORD: &str = "employee1";
const EMPLOYEE_EMAIL: &str = "employee1@company.com";

/// Make sure the default `admin` and `employee1` identities exist
pub async fn ensure_default_users(state: &AppState) -> AppResult<()> {
    if state.users.find_by_username(ADMIN_USERNAME).await?.is_some() {
        state.users.set_role(ADMIN_USERNAME, Role::Admin).await?;
    } else {
        state
            .users
            .create(&NewUser {
                username: ADMIN_USERNAME.to_string(),
                password_hash: password::hash_password(ADMIN_PASSWORD)?,
                role: Role::Admin,
                employee_id: None,
                permissions: None,
            })
            .await?;
        info!("Seeded default administrator");
    }

    if state.users.find_by_username(EMPLOYEE_USERNAME).await?.is_some() {
        return Ok(());
    }

    let identity = NewUser {
        username: EMPLOYEE_USERNAME.to_string(),
        password_hash: password::hash_password(EMPLOYEE_PASSWORD)?,
        role: Role::Employee,
        employee_id: None,
        permissions: None,
    };

    match state.employees.find_by_email(EMPLOYEE_EMAIL).await? {
        Some(employee) => {
            state
                .users
                .create(&NewUser {
                    employee_id: Some(employee.id),
                    ..identity
                })
                .await?;
        }
        None => {
            let fields = EmployeeFields {
                name: "Employee One".to_string(),
                email: EMPLOYEE_EMAIL.to_string(),
                role: "Staff".to_string(),
                department: "General".to_string(),
                status: EmployeeStatus::Active,
            };
            state.employees.provision(&fields, identity).await?;
        }
    }

    info!("Seeded default employee");
    Ok(())
}

/// Give every employee identity without stored permissions the default set
pub async fn migrate_default_permissions(state: &AppState) -> AppResult<()> {
    let migrated = state.users.backfill_default_permissions().await?;
    if migrated > 0 {
        info!("Stored default permissions for {} employee identities", migrated);
    }
    Ok(())
}
