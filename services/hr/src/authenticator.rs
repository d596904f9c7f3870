//! Authenticator abstraction
//!
//! The guard and the session flows only see [`Authenticator`], so the
//! signing and credential-checking mechanism can be replaced without
//! touching them.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    error::{AppError, AppResult},
    jwt::{Claims, JwtService},
    models::User,
    password,
    repositories::CredentialStore,
};

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Check a username/password pair and return the matching identity
    async fn authenticate(&self, username: &str, password: &str) -> AppResult<User>;

    /// Sign claims into a session token
    fn issue(&self, claims: &Claims) -> AppResult<String>;

    /// Verify a session token; any failure is [`AppError::InvalidToken`]
    fn verify(&self, token: &str) -> AppResult<Claims>;
}

/// Local credentials checked with Argon2, tokens signed with the server secret
pub struct LocalAuthenticator {
    store: Arc<dyn CredentialStore>,
    tokens: JwtService,
}

impl LocalAuthenticator {
    pub fn new(store: Arc<dyn CredentialStore>, tokens: JwtService) -> Self {
        Self { store, tokens }
    }
}

#[async_trait]
impl Authenticator for LocalAuthenticator {
    async fn authenticate(&self, username: &str, password: &str) -> AppResult<User> {
        let Some(user) = self.store.find_by_username(username).await? else {
            password::verify_dummy(password);
            warn!("Login failed: unknown username");
            return Err(AppError::invalid_credentials());
        };

        if !password::verify_password(password, &user.password_hash) {
            warn!("Login failed: wrong password for user {}", user.id);
            return Err(AppError::invalid_credentials());
        }

        Ok(user)
    }

    fn issue(&self, claims: &Claims) -> AppResult<String> {
        self.tokens
            .issue(claims)
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    fn verify(&self, token: &str) -> AppResult<Claims> {
        self.tokens.verify(token).map_err(|e| {
            debug!("Rejected token: {}", e);
            AppError::InvalidToken
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        jwt::JwtConfig,
        permissions::PermissionSet,
        repositories::UserRepository,
        test_support::{self, insert_admin},
    };
    use chrono::Utc;

    async fn authenticator() -> (LocalAuthenticator, sqlx::SqlitePool) {
        let pool = test_support::pool().await;
        let store = Arc::new(UserRepository::new(pool.clone()));
        let tokens = JwtService::new(&JwtConfig::new("test-secret"));
        (LocalAuthenticator::new(store, tokens), pool)
    }

    #[tokio::test]
    async fn test_authenticate_valid_credentials() {
        let (auth, pool) = authenticator().await;
        let admin = insert_admin(&pool, "admin", "admin").await;

        let user = auth.authenticate("admin", "admin").await.unwrap();
        assert_eq!(user.id, admin.id);
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_look_the_same() {
        let (auth, pool) = authenticator().await;
        insert_admin(&pool, "admin", "admin").await;

        let unknown = auth.authenticate("nobody", "admin").await.unwrap_err();
        let wrong = auth.authenticate("admin", "wrong").await.unwrap_err();

        assert_eq!(unknown.status(), wrong.status());
        assert_eq!(unknown.message(), wrong.message());
        assert_eq!(unknown.message(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_verify_maps_failures_to_invalid_token() {
        let (auth, pool) = authenticator().await;
        let admin = insert_admin(&pool, "admin", "admin").await;

        let token = auth
            .issue(&Claims::for_user(&admin, PermissionSet::new(), Utc::now()))
            .unwrap();
        assert_eq!(auth.verify(&token).unwrap().sub, admin.id);

        let err = auth.verify("not-a-token").unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }
}
