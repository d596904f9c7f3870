//! Employee administration endpoints

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    routing::{get, put},
};
use common::error::DatabaseError;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        CreateEmployeeRequest, EmployeeFields, EmployeeWithPermissions, NewUser, Role,
        UpdateEmployeeRequest,
    },
    password,
    repositories::CredentialStore,
    state::AppState,
    validation,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/employees", get(list).post(create))
        .route("/employees/:id", put(update).delete(remove))
}

async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<EmployeeWithPermissions>>> {
    Ok(Json(state.employees.list_with_permissions().await?))
}

/// Create an employee record, provisioning a linked login when
/// `username` and `password` are supplied.
async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateEmployeeRequest>, JsonRejection>,
) -> AppResult<Json<EmployeeWithPermissions>> {
    let Json(request) = payload?;
    let fields = fields_of(
        request.name.as_deref(),
        request.email.as_deref(),
        request.role.as_deref(),
        request.department.as_deref(),
        request.status.as_deref(),
    )?;
    let permissions = request.permissions.unwrap_or_default();

    let login = (
        validation::required(request.username.as_deref()),
        request.password.filter(|p| !p.is_empty()),
    );
    let employee = match login {
        (Some(username), Some(password)) => {
            validation::validate_username(&username).map_err(AppError::Validation)?;
            validation::validate_password(&password).map_err(AppError::Validation)?;

            if state.users.find_by_username(&username).await?.is_some() {
                warn!("Rejected employee creation: username {} is taken", username);
                return Err(AppError::Conflict("Username already exists".to_string()));
            }

            let identity = NewUser {
                username,
                password_hash: password::hash_password(&password)?,
                role: Role::Employee,
                employee_id: None,
                permissions: Some(permissions.clone()),
            };
            let (employee, _) = state
                .employees
                .provision(&fields, identity)
                .await
                .map_err(|e| match e {
                    DatabaseError::Conflict(_) => {
                        AppError::Conflict("Username already exists".to_string())
                    }
                    other => other.into(),
                })?;
            employee
        }
        (None, None) => state.employees.create(&fields).await?,
        _ => {
            return Err(AppError::Validation(
                "Username and password must be provided together".to_string(),
            ));
        }
    };

    Ok(Json(EmployeeWithPermissions {
        employee,
        permissions,
    }))
}

/// Update an employee; `permissions`, when present, replaces the linked login's set
async fn update(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateEmployeeRequest>, JsonRejection>,
) -> AppResult<Json<EmployeeWithPermissions>> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let fields = fields_of(
        request.name.as_deref(),
        request.email.as_deref(),
        request.role.as_deref(),
        request.department.as_deref(),
        request.status.as_deref(),
    )?;

    let employee = state
        .employees
        .update(id, &fields)
        .await?
        .ok_or_else(|| AppError::not_found("Employee not found"))?;

    let permissions = match request.permissions {
        Some(permissions) => {
            if state
                .users
                .replace_permissions_for_employee(id, &permissions)
                .await?
            {
                info!("Replaced permissions of employee {}", id);
            }
            permissions
        }
        None => state
            .users
            .permissions_by_employee()
            .await?
            .remove(&id)
            .unwrap_or_default(),
    };

    Ok(Json(EmployeeWithPermissions {
        employee,
        permissions,
    }))
}

/// Delete an employee together with its linked login
async fn remove(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<Value>> {
    let Path(id) = id?;

    if !state.employees.delete_with_identity(id).await? {
        return Err(AppError::not_found("Employee not found"));
    }

    Ok(super::ok())
}

fn fields_of(
    name: Option<&str>,
    email: Option<&str>,
    role: Option<&str>,
    department: Option<&str>,
    status: Option<&str>,
) -> AppResult<EmployeeFields> {
    validation::employee_fields(name, email, role, department, status).map_err(AppError::Validation)
}
