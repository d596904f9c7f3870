//! Company settings endpoints

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::get,
};
use serde_json::Value;
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings).put(merge_settings))
}

async fn get_settings(State(state): State<AppState>) -> AppResult<Json<Value>> {
    Ok(Json(Value::Object(state.settings.get_all().await?)))
}

/// Merge the supplied keys into the stored settings
async fn merge_settings(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(body) = payload?;
    let Value::Object(patch) = body else {
        return Err(AppError::Validation(
            "Settings must be a JSON object".to_string(),
        ));
    };

    state.settings.merge(&patch).await?;
    info!("Updated {} setting(s)", patch.len());

    Ok(super::ok())
}
