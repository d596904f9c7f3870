//! Role assignment
//!
//! An `admin` identity never references an employee record, and an
//! `employee` identity always does. Promotion therefore detaches the
//! identity from its record; demotion is only possible for an identity that
//! is still linked. Tokens issued before the change keep their old role
//! until they expire.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Role, SetRoleRequest},
    repositories::CredentialStore,
    state::AppState,
    validation,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/admin/set-role", post(set_role))
}

async fn set_role(
    State(state): State<AppState>,
    payload: Result<Json<SetRoleRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(request) = payload?;

    let (Some(uid), Some(role)) = (
        validation::required(request.uid.as_deref()),
        validation::required(request.role.as_deref()),
    ) else {
        return Err(AppError::Validation("Missing fields".to_string()));
    };
    let id: Uuid = uid
        .parse()
        .map_err(|_| AppError::Validation("Invalid id".to_string()))?;
    let role: Role = role
        .parse()
        .map_err(|_| AppError::Validation("Invalid role".to_string()))?;

    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let employee_id = match (role, user.employee_id) {
        (Role::Admin, linked) => {
            if let Some(employee_id) = linked {
                info!("Detaching user {} from employee {}", user.id, employee_id);
            }
            None
        }
        (Role::Employee, Some(employee_id)) => Some(employee_id),
        (Role::Employee, None) => {
            warn!("Refused to demote unlinked user {}", user.id);
            return Err(AppError::Conflict("User has no employee record".to_string()));
        }
    };

    if !state.users.assign_role(user.id, role, employee_id).await? {
        return Err(AppError::not_found("User not found"));
    }

    Ok(super::ok())
}

#[cfg(test)]
mod tests {
    use crate::test_support::{self, send};
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_set_role_validates_input() {
        let state = test_support::app_state().await;
        test_support::insert_admin(&state.pool, "admin", "admin").await;
        let (_, user) =
            test_support::insert_employee_user(&state.pool, "employee1", "employee1", None).await;
        let token = test_support::login(&state, "admin", "admin").await;

        let cases = [
            (json!({ "role": "admin" }), StatusCode::BAD_REQUEST, "Missing fields"),
            (json!({ "uid": user.id }), StatusCode::BAD_REQUEST, "Missing fields"),
            (
                json!({ "uid": "not-a-uuid", "role": "admin" }),
                StatusCode::BAD_REQUEST,
                "Invalid id",
            ),
            (
                json!({ "uid": user.id, "role": "manager" }),
                StatusCode::BAD_REQUEST,
                "Invalid role",
            ),
            (
                json!({ "uid": Uuid::new_v4(), "role": "admin" }),
                StatusCode::NOT_FOUND,
                "User not found",
            ),
        ];

        for (payload, expected_status, expected_message) in cases {
            let (status, body) = send(
                test_support::app(&state),
                Method::POST,
                "/admin/set-role",
                Some(&token),
                Some(payload),
            )
            .await;
            assert_eq!(status, expected_status);
            assert_eq!(body, json!({ "message": expected_message }));
        }
    }

    #[tokio::test]
    async fn test_employees_cannot_assign_roles() {
        let state = test_support::app_state().await;
        let (_, user) =
            test_support::insert_employee_user(&state.pool, "employee1", "employee1", None).await;
        let token = test_support::login(&state, "employee1", "employee1").await;

        let (status, _) = send(
            test_support::app(&state),
            Method::POST,
            "/admin/set-role",
            Some(&token),
            Some(json!({ "uid": user.id, "role": "admin" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_promotion_detaches_employee_and_leaves_old_tokens_stale() {
        let state = test_support::app_state().await;
        test_support::insert_admin(&state.pool, "admin", "admin").await;
        let (_, user) =
            test_support::insert_employee_user(&state.pool, "employee1", "employee1", None).await;
        let admin = test_support::login(&state, "admin", "admin").await;
        let before = test_support::login(&state, "employee1", "employee1").await;

        let (status, body) = send(
            test_support::app(&state),
            Method::POST,
            "/admin/set-role",
            Some(&admin),
            Some(json!({ "uid": user.id, "role": "admin" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));

        // The token issued before the change still carries the employee role.
        let (status, _) =
            send(test_support::app(&state), Method::GET, "/employees", Some(&before), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let after = test_support::login(&state, "employee1", "employee1").await;
        let (status, _) =
            send(test_support::app(&state), Method::GET, "/employees", Some(&after), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, me) =
            send(test_support::app(&state), Method::GET, "/auth/me", Some(&after), None).await;
        assert_eq!(me["user"]["role"], "admin");
        assert_eq!(me["user"]["employee_id"], json!(null));
    }

    #[tokio::test]
    async fn test_unlinked_identity_cannot_become_employee() {
        let state = test_support::app_state().await;
        let admin_user = test_support::insert_admin(&state.pool, "admin", "admin").await;
        let token = test_support::login(&state, "admin", "admin").await;

        let (status, body) = send(
            test_support::app(&state),
            Method::POST,
            "/admin/set-role",
            Some(&token),
            Some(json!({ "uid": admin_user.id, "role": "employee" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, json!({ "message": "User has no employee record" }));

        // Re-asserting the current role of a linked identity is accepted.
        let (_, user) =
            test_support::insert_employee_user(&state.pool, "employee1", "employee1", None).await;
        let (status, _) = send(
            test_support::app(&state),
            Method::POST,
            "/admin/set-role",
            Some(&token),
            Some(json!({ "uid": user.id, "role": "employee" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}
