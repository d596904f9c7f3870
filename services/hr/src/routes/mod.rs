//! HTTP routes of the HR service
//!
//! Route groups are layered with the authorization guard according to what
//! they require of the caller; handlers read the verified claims from the
//! request extensions.

use axum::{
    Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;

use crate::{
    error::{AppError, AppResult},
    middleware::{Requirement, guard},
    models::Role,
    state::AppState,
};

mod admin;
mod attendance;
mod auth;
mod employees;
mod leave;
mod self_service;
mod settings;

/// Create the router for the HR service
pub fn create_router(state: AppState, cors: CorsLayer) -> Router {
    let admin = Router::new()
        .route("/auth/change-password", post(auth::change_password))
        .merge(admin::router())
        .merge(employees::router())
        .merge(attendance::router())
        .merge(leave::router())
        .merge(settings::router())
        .route_layer(from_fn_with_state(
            state.guard(Requirement::Role(Role::Admin)),
            guard,
        ));

    let authenticated = Router::new()
        .route("/auth/me", get(auth::me))
        .route_layer(from_fn_with_state(
            state.guard(Requirement::Authenticated),
            guard,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/login", post(auth::login))
        .merge(authenticated)
        .merge(admin)
        .merge(self_service::router(&state))
        .fallback(|| async { AppError::not_found("Not found") })
        .method_not_allowed_fallback(|| async { AppError::MethodNotAllowed })
        .with_state(state)
        .layer(cors)
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let ok = common::database::health_check(&state.pool).await?;
    Ok(Json(json!({ "ok": ok })))
}

/// `{"ok": true}` acknowledgement for mutations without a resource body
fn ok() -> Json<Value> {
    Json(json!({ "ok": true }))
}
