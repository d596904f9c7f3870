//! Authorization guard
//!
//! Every protected route group is wrapped in [`guard`] with a
//! [`Requirement`]. The guard extracts the bearer token, verifies it through
//! the [`Authenticator`], evaluates the requirement and hands the verified
//! [`Claims`] to the handler through the request extensions.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use std::{fmt, sync::Arc};
use tracing::warn;

use crate::{
    authenticator::Authenticator,
    error::{AppError, AppResult},
    jwt::Claims,
    models::Role,
};

/// What a route group demands of the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Any valid token
    Authenticated,
    /// A token carrying this role; administrators pass regardless
    Role(Role),
    /// A token granting this named permission
    Permission(&'static str),
}

impl Requirement {
    /// Whether `claims` meet the requirement on their own merits
    pub fn satisfied_by(&self, claims: &Claims) -> bool {
        match self {
            Requirement::Authenticated => true,
            Requirement::Role(role) => claims.role == *role,
            Requirement::Permission(name) => claims.permissions.grants(name),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Authenticated => f.write_str("authenticated"),
            Requirement::Role(role) => write!(f, "role={}", role),
            Requirement::Permission(name) => write!(f, "permission={}", name),
        }
    }
}

/// The single authorization predicate: administrators pass every requirement.
pub fn allowed(claims: &Claims, requirement: Requirement) -> bool {
    claims.role == Role::Admin || requirement.satisfied_by(claims)
}

/// Verify `token` and check it against `requirement`
pub fn authorize(
    authenticator: &dyn Authenticator,
    token: Option<&str>,
    requirement: Requirement,
) -> AppResult<Claims> {
    let token = token.filter(|t| !t.is_empty()).ok_or_else(|| {
        warn!("Rejected request without a bearer token");
        AppError::MissingToken
    })?;

    let claims = authenticator.verify(token).inspect_err(|_| {
        warn!("Rejected request with an invalid token");
    })?;

    if !allowed(&claims, requirement) {
        warn!(
            "User {} ({}) denied: requires {}",
            claims.sub, claims.role, requirement
        );
        return Err(AppError::Forbidden);
    }

    Ok(claims)
}

/// Middleware state: the authenticator plus the requirement of one route group
#[derive(Clone)]
pub struct Guard {
    authenticator: Arc<dyn Authenticator>,
    requirement: Requirement,
}

impl Guard {
    pub fn new(authenticator: Arc<dyn Authenticator>, requirement: Requirement) -> Self {
        Self {
            authenticator,
            requirement,
        }
    }
}

/// Extract and validate the bearer token, then enforce the guard's requirement.
///
/// A header that is not of the form `Bearer <token>` counts as missing.
pub async fn guard(
    State(guard): State<Guard>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer.as_ref().map(|TypedHeader(auth)| auth.token());
    let claims = authorize(guard.authenticator.as_ref(), token, guard.requirement)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
