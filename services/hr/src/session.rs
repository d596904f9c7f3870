//! Session issuance and credential maintenance

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    authenticator::Authenticator,
    error::{AppError, AppResult},
    jwt::Claims,
    models::{ChangePasswordRequest, LoginCredentials, PublicUser},
    password,
    permissions,
    repositories::CredentialStore,
    validation,
};

/// A freshly issued session
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user: PublicUser,
}

/// Session manager for logins and password changes
#[derive(Clone)]
pub struct SessionManager {
    authenticator: Arc<dyn Authenticator>,
    store: Arc<dyn CredentialStore>,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(authenticator: Arc<dyn Authenticator>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            authenticator,
            store,
        }
    }

    /// Check credentials, resolve the permission snapshot and issue a token
    pub async fn login(&self, credentials: &LoginCredentials) -> AppResult<Session> {
        let (Some(username), Some(password)) = (
            non_empty(credentials.username.as_deref()),
            non_empty(credentials.password.as_deref()),
        ) else {
            return Err(AppError::Validation(
                "Username and password required".to_string(),
            ));
        };

        let user = self.authenticator.authenticate(username, password).await?;
        let permissions = permissions::resolve_and_backfill(self.store.as_ref(), &user).await?;

        let claims = Claims::for_user(&user, permissions, Utc::now());
        let token = self.authenticator.issue(&claims)?;

        info!("User {} logged in as {}", user.id, user.role);

        Ok(Session {
            token,
            user: PublicUser::from(&claims),
        })
    }

    /// Replace the password of the identity named by `claims`.
    ///
    /// Previously issued tokens stay valid until they expire.
    pub async fn change_password(
        &self,
        claims: &Claims,
        request: &ChangePasswordRequest,
    ) -> AppResult<()> {
        let (Some(current), Some(new)) = (
            non_empty(request.current_password.as_deref()),
            non_empty(request.new_password.as_deref()),
        ) else {
            return Err(AppError::Validation("Missing fields".to_string()));
        };
        validation::validate_password(new).map_err(AppError::Validation)?;

        let user = self
            .store
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if !password::verify_password(current, &user.password_hash) {
            warn!("Password change for user {} rejected: wrong current password", user.id);
            return Err(AppError::InvalidCredentials(
                "Invalid current password".to_string(),
            ));
        }

        let hash = password::hash_password(new)?;
        if !self.store.update_password_hash(user.id, &hash).await? {
            return Err(AppError::not_found("User not found"));
        }

        info!("Password changed for user {}", user.id);
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
