//! Login, identity and password endpoints

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::{Value, json};

use crate::{
    error::AppResult,
    jwt::Claims,
    models::{ChangePasswordRequest, LoginCredentials, PublicUser},
    session::Session,
    state::AppState,
};

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginCredentials>, JsonRejection>,
) -> AppResult<Json<Session>> {
    let Json(credentials) = payload?;
    let session = state.sessions.login(&credentials).await?;
    Ok(Json(session))
}

/// The identity carried by the caller's token
pub async fn me(Extension(claims): Extension<Claims>) -> Json<Value> {
    Json(json!({ "user": PublicUser::from(&claims) }))
}

/// Change the caller's own password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(request) = payload?;
    state.sessions.change_password(&claims, &request).await?;
    Ok(super::ok())
}

#[cfg(test)]
mod tests {
    use crate::test_support::{self, send};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_admin_login_then_me() {
        let state = test_support::app_state().await;
        let admin = test_support::insert_admin(&state.pool, "admin", "admin").await;

        let (status, body) = send(
            test_support::app(&state),
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": "admin", "password": "admin" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap().to_string();
        assert!(body["user"].get("password_hash").is_none());

        let (status, body) =
            send(test_support::app(&state), Method::GET, "/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "user": {
                    "id": admin.id,
                    "username": "admin",
                    "role": "admin",
                    "employee_id": null,
                    "permissions": {}
                }
            })
        );
    }

    #[tokio::test]
    async fn test_bad_login_is_401_with_same_message() {
        let state = test_support::app_state().await;
        test_support::insert_admin(&state.pool, "admin", "admin").await;

        let mut bodies = Vec::new();
        for (username, password) in [("admin", "wrong"), ("ghost", "admin")] {
            let (status, body) = send(
                test_support::app(&state),
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            bodies.push(body);
        }
        assert_eq!(bodies[0], bodies[1]);
        assert_eq!(bodies[0], json!({ "message": "Invalid credentials" }));
    }

    #[tokio::test]
    async fn test_malformed_login_body_is_400() {
        let state = test_support::app_state().await;

        let (status, body) = send(
            test_support::app(&state),
            Method::POST,
            "/auth/login",
            None,
            Some(json!(["not", "an", "object"])),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_change_password_rejects_short_password() {
        let state = test_support::app_state().await;
        test_support::insert_admin(&state.pool, "admin", "admin").await;
        let token = test_support::login(&state, "admin", "admin").await;

        let (status, body) = send(
            test_support::app(&state),
            Method::POST,
            "/auth/change-password",
            Some(&token),
            Some(json!({ "currentPassword": "admin", "newPassword": "12345" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": "Password must be at least 6 characters" }));

        let (status, _) = send(
            test_support::app(&state),
            Method::POST,
            "/auth/change-password",
            Some(&token),
            Some(json!({ "currentPassword": "admin", "newPassword": "123456" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_change_password_is_admin_only() {
        let state = test_support::app_state().await;
        test_support::insert_employee_user(&state.pool, "employee1", "employee1", None).await;
        let token = test_support::login(&state, "employee1", "employee1").await;

        let (status, _) = send(
            test_support::app(&state),
            Method::POST,
            "/auth/change-password",
            Some(&token),
            Some(json!({ "currentPassword": "employee1", "newPassword": "123456" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
