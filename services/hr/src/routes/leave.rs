//! Leave request administration endpoints

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    routing::{get, put},
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{LeaveInput, LeaveRequest, LeaveStatus},
    repositories::NewLeaveRequest,
    state::AppState,
    validation,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/leave", get(list).post(create))
        .route("/leave/:id", put(update).delete(remove))
}

async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<LeaveRequest>>> {
    Ok(Json(state.leave.list_all().await?))
}

async fn create(
    State(state): State<AppState>,
    payload: Result<Json<LeaveInput>, JsonRejection>,
) -> AppResult<Json<LeaveRequest>> {
    let Json(input) = payload?;
    let request = new_leave_request(input)?;

    Ok(Json(state.leave.create(&request).await?))
}

async fn update(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<LeaveInput>, JsonRejection>,
) -> AppResult<Json<LeaveRequest>> {
    let Path(id) = id?;
    let Json(input) = payload?;
    let request = new_leave_request(input)?;

    state
        .leave
        .update(id, &request)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Not found"))
}

async fn remove(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<Value>> {
    let Path(id) = id?;

    if !state.leave.delete(id).await? {
        return Err(AppError::not_found("Not found"));
    }

    Ok(super::ok())
}

/// Admin input to a leave row; a missing status files the request as pending
fn new_leave_request(input: LeaveInput) -> AppResult<NewLeaveRequest> {
    let (Some(employee_id), Some(start_date), Some(end_date), Some(reason)) = (
        input.employee_id,
        input.start_date,
        input.end_date,
        validation::required(input.reason.as_deref()),
    ) else {
        return Err(AppError::Validation("Missing fields".to_string()));
    };
    validation::validate_date_range(start_date, end_date).map_err(AppError::Validation)?;

    Ok(NewLeaveRequest {
        employee_id,
        start_date,
        end_date,
        reason,
        status: input.status.unwrap_or(LeaveStatus::Pending),
    })
}
