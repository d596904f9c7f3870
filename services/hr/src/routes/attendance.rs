//! Attendance administration endpoints

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    routing::{get, put},
};
use chrono::NaiveDate;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{AttendanceInput, AttendanceRecord},
    state::AppState,
    validation,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/attendance", get(list).post(create))
        .route("/attendance/:id", put(update).delete(remove))
}

async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<AttendanceRecord>>> {
    Ok(Json(state.attendance.list_all().await?))
}

async fn create(
    State(state): State<AppState>,
    payload: Result<Json<AttendanceInput>, JsonRejection>,
) -> AppResult<Json<AttendanceRecord>> {
    let Json(input) = payload?;
    let (employee_id, date, status) = required_fields(&input)?;

    let record = state.attendance.create(employee_id, date, &status).await?;
    Ok(Json(record))
}

async fn update(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<AttendanceInput>, JsonRejection>,
) -> AppResult<Json<AttendanceRecord>> {
    let Path(id) = id?;
    let Json(input) = payload?;
    let (employee_id, date, status) = required_fields(&input)?;

    state
        .attendance
        .update(id, employee_id, date, &status)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Not found"))
}

async fn remove(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<Value>> {
    let Path(id) = id?;

    if !state.attendance.delete(id).await? {
        return Err(AppError::not_found("Not found"));
    }

    Ok(super::ok())
}

fn required_fields(input: &AttendanceInput) -> AppResult<(Uuid, NaiveDate, String)> {
    match (
        input.employee_id,
        input.date,
        validation::required(input.status.as_deref()),
    ) {
        (Some(employee_id), Some(date), Some(status)) => Ok((employee_id, date, status)),
        _ => Err(AppError::Validation("Missing fields".to_string())),
    }
}
