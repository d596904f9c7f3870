//! Employee self-service endpoints
//!
//! Every handler works on the employee record referenced by the caller's
//! token; there is no way to address another employee's data.

use axum::{
    Extension, Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    middleware::from_fn_with_state,
    routing::{delete, get},
};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    jwt::Claims,
    middleware::{Requirement, guard},
    models::{AttendanceRecord, Employee, LeaveApplication, LeaveRequest, LeaveStatus},
    ownership,
    permissions::{ATTENDANCE_VIEW, LEAVE_APPLY, PROFILE_VIEW},
    repositories::NewLeaveRequest,
    state::AppState,
    validation,
};

pub fn router(state: &AppState) -> Router<AppState> {
    let profile_routes = Router::new()
        .route("/employee/me", get(profile))
        .route_layer(from_fn_with_state(
            state.guard(Requirement::Permission(PROFILE_VIEW)),
            guard,
        ));
    let attendance_routes = Router::new()
        .route("/employee/attendance", get(own_attendance))
        .route_layer(from_fn_with_state(
            state.guard(Requirement::Permission(ATTENDANCE_VIEW)),
            guard,
        ));
    let leave_routes = Router::new()
        .route("/employee/leave", get(own_leave).post(apply))
        .route("/employee/leave/:id", delete(withdraw))
        .route_layer(from_fn_with_state(
            state.guard(Requirement::Permission(LEAVE_APPLY)),
            guard,
        ));

    profile_routes.merge(attendance_routes).merge(leave_routes)
}

/// The caller's employee record id
fn own_employee_id(claims: &Claims) -> AppResult<Uuid> {
    claims
        .employee_id
        .ok_or_else(|| AppError::not_found("Employee not found"))
}

async fn profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Employee>> {
    let employee_id = own_employee_id(&claims)?;

    state
        .employees
        .find_by_id(employee_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Employee not found"))
}

async fn own_attendance(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<AttendanceRecord>>> {
    let employee_id = own_employee_id(&claims)?;
    Ok(Json(state.attendance.list_for_employee(employee_id).await?))
}

async fn own_leave(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<LeaveRequest>>> {
    let employee_id = own_employee_id(&claims)?;
    Ok(Json(state.leave.list_for_employee(employee_id).await?))
}

/// File a pending leave request for the caller
async fn apply(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<LeaveApplication>, JsonRejection>,
) -> AppResult<Json<LeaveRequest>> {
    let employee_id = own_employee_id(&claims)?;
    let Json(application) = payload?;

    let (Some(start_date), Some(end_date), Some(reason)) = (
        application.start_date,
        application.end_date,
        validation::required(application.reason.as_deref()),
    ) else {
        return Err(AppError::Validation("Missing fields".to_string()));
    };
    validation::validate_date_range(start_date, end_date).map_err(AppError::Validation)?;

    let request = state
        .leave
        .create(&NewLeaveRequest {
            employee_id,
            start_date,
            end_date,
            reason,
            status: LeaveStatus::Pending,
        })
        .await?;

    Ok(Json(request))
}

/// Withdraw one of the caller's own pending requests
async fn withdraw(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<Value>> {
    let Path(id) = id?;

    let request = ownership::authorize_mutation(&claims, state.leave.find_by_id(id).await?)?;

    if !state
        .leave
        .delete_pending_owned(request.id, request.employee_id)
        .await?
    {
        return Err(lost_withdrawal(state.leave.find_by_id(request.id).await?));
    }

    info!("User {} withdrew leave request {}", claims.sub, request.id);
    Ok(super::ok())
}

/// Error for a withdrawal whose delete matched nothing, given the row as it
/// stands now: removed in the meantime or decided in the meantime.
fn lost_withdrawal(current: Option<LeaveRequest>) -> AppError {
    match current {
        None => AppError::not_found("Not found"),
        Some(_) => AppError::Forbidden,
    }
}

#[cfg(test)]
mod tests {
    use super::lost_withdrawal;
    use crate::{
        error::AppError,
        models::{LeaveRequest, LeaveStatus},
        permissions::{LEAVE_APPLY, PROFILE_VIEW, PermissionSet},
        state::AppState,
        test_support::{self, send},
    };
    use axum::http::{Method, StatusCode};
    use chrono::{NaiveDate, Utc};
    use serde_json::{Value, json};
    use uuid::Uuid;

    fn application() -> Value {
        json!({ "start_date": "2024-07-01", "end_date": "2024-07-03", "reason": "Trip" })
    }

    async fn file_leave(state: &AppState, token: &str) -> String {
        let (status, body) = send(
            test_support::app(state),
            Method::POST,
            "/employee/leave",
            Some(token),
            Some(application()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_profile_is_own_record() {
        let state = test_support::app_state().await;
        let (employee, _) =
            test_support::insert_employee_user(&state.pool, "employee1", "employee1", None).await;
        let token = test_support::login(&state, "employee1", "employee1").await;

        let (status, body) =
            send(test_support::app(&state), Method::GET, "/employee/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], json!(employee.id));
    }

    #[tokio::test]
    async fn test_admin_has_no_own_record() {
        let state = test_support::app_state().await;
        test_support::insert_admin(&state.pool, "admin", "admin").await;
        let token = test_support::login(&state, "admin", "admin").await;

        let (status, body) =
            send(test_support::app(&state), Method::GET, "/employee/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Employee not found" }));
    }

    #[tokio::test]
    async fn test_revoked_permission_is_403() {
        let state = test_support::app_state().await;
        let mut stored = PermissionSet::new();
        stored.set(PROFILE_VIEW, false);
        test_support::insert_employee_user(&state.pool, "employee1", "employee1", Some(stored))
            .await;
        let token = test_support::login(&state, "employee1", "employee1").await;

        let (status, _) =
            send(test_support::app(&state), Method::GET, "/employee/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            test_support::app(&state),
            Method::GET,
            "/employee/attendance",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_apply_list_and_withdraw() {
        let state = test_support::app_state().await;
        test_support::insert_employee_user(&state.pool, "employee1", "employee1", None).await;
        let token = test_support::login(&state, "employee1", "employee1").await;

        let id = file_leave(&state, &token).await;

        let (_, listed) =
            send(test_support::app(&state), Method::GET, "/employee/leave", Some(&token), None)
                .await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["status"], "Pending");

        let uri = format!("/employee/leave/{}", id);
        let (status, _) =
            send(test_support::app(&state), Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) =
            send(test_support::app(&state), Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cannot_withdraw_another_employees_leave() {
        let state = test_support::app_state().await;
        test_support::insert_employee_user(&state.pool, "alice", "alice1", None).await;
        test_support::insert_employee_user(&state.pool, "bob", "bob123", None).await;
        let alice = test_support::login(&state, "alice", "alice1").await;
        let bob = test_support::login(&state, "bob", "bob123").await;

        let id = file_leave(&state, &alice).await;

        let (status, body) = send(
            test_support::app(&state),
            Method::DELETE,
            &format!("/employee/leave/{}", id),
            Some(&bob),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "message": "Forbidden" }));
    }

    #[tokio::test]
    async fn test_cannot_withdraw_decided_leave() {
        let state = test_support::app_state().await;
        test_support::insert_employee_user(&state.pool, "employee1", "employee1", None).await;
        let token = test_support::login(&state, "employee1", "employee1").await;
        let id = file_leave(&state, &token).await;

        sqlx::query("UPDATE leave_requests SET status = 'Approved' WHERE id = ?")
            .bind(&id)
            .execute(&state.pool)
            .await
            .unwrap();

        let (status, _) = send(
            test_support::app(&state),
            Method::DELETE,
            &format!("/employee/leave/{}", id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_leave_apply_gate() {
        let state = test_support::app_state().await;
        let mut stored = PermissionSet::new();
        stored.set(LEAVE_APPLY, false);
        test_support::insert_employee_user(&state.pool, "employee1", "employee1", Some(stored))
            .await;
        test_support::insert_admin(&state.pool, "admin", "admin").await;
        let employee = test_support::login(&state, "employee1", "employee1").await;
        let admin = test_support::login(&state, "admin", "admin").await;

        let (status, _) = send(
            test_support::app(&state),
            Method::POST,
            "/employee/leave",
            Some(&employee),
            Some(application()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // Administrators pass the gate; they simply have no own record.
        let (status, _) = send(
            test_support::app(&state),
            Method::POST,
            "/employee/leave",
            Some(&admin),
            Some(application()),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_lost_withdrawal_distinguishes_removed_from_decided() {
        assert!(matches!(lost_withdrawal(None), AppError::NotFound(_)));

        let decided = LeaveRequest {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            employee_name: None,
            start_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 7, 3).unwrap(),
            reason: "Trip".to_string(),
            status: LeaveStatus::Approved,
            created_at: Utc::now(),
        };
        assert!(matches!(lost_withdrawal(Some(decided)), AppError::Forbidden));
    }
}
