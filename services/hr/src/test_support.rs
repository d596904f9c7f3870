//! Shared fixtures for unit and router tests

use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Method, Request, StatusCode, header},
};
use chrono::Utc;
use common::database::{DatabaseConfig, init_pool, init_schema};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    config,
    jwt::{Claims, JwtConfig},
    models::{Employee, EmployeeFields, EmployeeStatus, LoginCredentials, NewUser, Role, User},
    password,
    permissions::PermissionSet,
    repositories::{EmployeeRepository, UserRepository},
    routes,
    state::AppState,
};

pub const TEST_SECRET: &str = "test-secret";
pub const CLIENT_ORIGIN: &str = "http://localhost:5173";

/// Fresh in-memory database with the schema applied
pub async fn pool() -> SqlitePool {
    let pool = init_pool(&DatabaseConfig::in_memory()).await.unwrap();
    init_schema(&pool).await.unwrap();
    pool
}

pub async fn app_state() -> AppState {
    AppState::new(pool().await, &JwtConfig::new(TEST_SECRET))
}

pub fn app(state: &AppState) -> Router {
    routes::create_router(
        state.clone(),
        config::cors_layer(HeaderValue::from_static(CLIENT_ORIGIN)),
    )
}

pub fn fields(name: &str) -> EmployeeFields {
    EmployeeFields {
        name: name.to_string(),
        email: format!("{}@company.com", name.to_lowercase().replace(' ', ".")),
        role: "Staff".to_string(),
        department: "General".to_string(),
        status: EmployeeStatus::Active,
    }
}

/// Employee record without a login
pub async fn insert_employee(pool: &SqlitePool, name: &str) -> Employee {
    EmployeeRepository::new(pool.clone())
        .create(&fields(name))
        .await
        .unwrap()
}

pub async fn insert_admin(pool: &SqlitePool, username: &str, password: &str) -> User {
    UserRepository::new(pool.clone())
        .create(&NewUser {
            username: username.to_string(),
            password_hash: password::hash_password(password).unwrap(),
            role: Role::Admin,
            employee_id: None,
            permissions: None,
        })
        .await
        .unwrap()
}

/// Employee record plus a linked `employee` identity
pub async fn insert_employee_user(
    pool: &SqlitePool,
    username: &str,
    password: &str,
    permissions: Option<PermissionSet>,
) -> (Employee, User) {
    EmployeeRepository::new(pool.clone())
        .provision(
            &fields(username),
            NewUser {
                username: username.to_string(),
                password_hash: password::hash_password(password).unwrap(),
                role: Role::Employee,
                employee_id: None,
                permissions,
            },
        )
        .await
        .unwrap()
}

pub fn credentials(username: &str, password: &str) -> LoginCredentials {
    LoginCredentials {
        username: Some(username.to_string()),
        password: Some(password.to_string()),
    }
}

/// Claims of an administrator that does not exist in the store
pub fn admin_claims() -> Claims {
    let now = Utc::now().timestamp() as u64;
    Claims {
        sub: Uuid::new_v4(),
        username: "admin".to_string(),
        role: Role::Admin,
        employee_id: None,
        permissions: PermissionSet::new(),
        iat: now,
        exp: now + 3600,
    }
}

pub async fn login(state: &AppState, username: &str, password: &str) -> String {
    state
        .sessions
        .login(&credentials(username, password))
        .await
        .unwrap()
        .token
}

/// Send one request through the router and decode the JSON response body
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}
