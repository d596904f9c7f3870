//! JWT service for session token issuance and verification
//!
//! Session tokens are HS256-signed with a server-held secret and carry a
//! snapshot of the identity's role, employee reference and permission set.
//! Verification is purely local: it checks the signature and the expiry and
//! never consults storage, so permission changes only reach a client once it
//! logs in again.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::{
    models::{Role, User},
    permissions::PermissionSet,
};

/// Fixed session lifetime: two hours
pub const TOKEN_LIFETIME_SECS: u64 = 2 * 60 * 60;

const DEVELOPMENT_SECRET: &str = "dev_secret_change_me";

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Symmetric signing secret
    pub secret: String,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: signing secret (falls back to a development secret)
    pub fn from_env() -> Self {
        match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => Self::new(secret),
            _ => {
                warn!("JWT_SECRET not set, using the development secret");
                Self::new(DEVELOPMENT_SECRET)
            }
        }
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    pub username: String,
    pub role: Role,
    /// Linked employee record, `None` for administrators
    pub employee_id: Option<Uuid>,
    /// Permission snapshot taken at issuance
    pub permissions: PermissionSet,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

impl Claims {
    /// Claims for `user` issued at `issued_at`, expiring after [`TOKEN_LIFETIME_SECS`]
    pub fn for_user(user: &User, permissions: PermissionSet, issued_at: DateTime<Utc>) -> Self {
        let iat = issued_at.timestamp().max(0) as u64;
        Self {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            employee_id: user.employee_id,
            permissions,
            iat,
            exp: iat + TOKEN_LIFETIME_SECS,
        }
    }
}

/// Token codec errors
#[derive(Error, Debug)]
pub enum TokenError {
    /// Bad signature, malformed structure or expired token
    #[error("Invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("Failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Sign `claims` into a compact token
    pub fn issue(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Validate a token and return the claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::LEAVE_APPLY;
    use chrono::Duration;

    fn service(secret: &str) -> JwtService {
        JwtService::new(&JwtConfig::new(secret))
    }

    fn employee() -> User {
        User {
            id: Uuid::new_v4(),
            username: "employee1".to_string(),
            password_hash: "never-in-token".to_string(),
            role: Role::Employee,
            employee_id: Some(Uuid::new_v4()),
            permissions: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let jwt = service("test-secret");
        let user = employee();
        let claims = Claims::for_user(&user, PermissionSet::employee_defaults(), Utc::now());

        let token = jwt.issue(&claims).unwrap();
        let verified = jwt.verify(&token).unwrap();

        assert_eq!(verified, claims);
        assert_eq!(verified.exp - verified.iat, TOKEN_LIFETIME_SECS);
        assert!(verified.permissions.grants(LEAVE_APPLY));
    }

    #[test]
    fn test_token_never_contains_password_hash() {
        let jwt = service("test-secret");
        let token = jwt
            .issue(&Claims::for_user(&employee(), PermissionSet::new(), Utc::now()))
            .unwrap();

        let decoded = serde_json::to_string(&jwt.verify(&token).unwrap()).unwrap();
        assert!(!decoded.contains("never-in-token"));
        assert!(!decoded.contains("password"));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let claims = Claims::for_user(&employee(), PermissionSet::new(), Utc::now());
        let token = service("secret-a").issue(&claims).unwrap();

        assert!(matches!(
            service("secret-b").verify(&token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt = service("test-secret");
        let issued = Utc::now() - Duration::hours(3);
        let claims = Claims::for_user(&employee(), PermissionSet::new(), issued);

        let token = jwt.issue(&claims).unwrap();
        assert!(matches!(jwt.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_token_near_end_of_lifetime_is_accepted() {
        let jwt = service("test-secret");
        let issued = Utc::now() - Duration::minutes(119);
        let claims = Claims::for_user(&employee(), PermissionSet::new(), issued);

        let token = jwt.issue(&claims).unwrap();
        assert!(jwt.verify(&token).is_ok());
    }

    #[test]
    fn test_malformed_and_tampered_tokens_are_rejected() {
        let jwt = service("test-secret");
        assert!(jwt.verify("not-a-jwt").is_err());
        assert!(jwt.verify("").is_err());

        let claims = Claims::for_user(&employee(), PermissionSet::new(), Utc::now());
        let token = jwt.issue(&claims).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_claims = Claims {
            role: Role::Admin,
            ..claims
        };
        let forged = jwt.issue(&forged_claims).unwrap();
        parts[1] = forged.split('.').nth(1).unwrap();
        let tampered = parts.join(".");

        assert!(jwt.verify(&tampered).is_err());
    }

    #[test]
    fn test_debug_output_hides_secret() {
        let rendered = format!("{:?}", JwtConfig::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
    }
}
