//! Service configuration

use axum::http::{HeaderValue, Method, header};
use std::{env, net::SocketAddr, time::Duration};
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Default listen address of the HTTP server
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:4000";

/// Origin of the browser front end allowed to call the API
pub const DEFAULT_CLIENT_ORIGIN: &str = "http://localhost:5173";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: SocketAddr,
    /// Create the default `admin` and `employee1` identities at start-up
    pub seed_default_users: bool,
    pub client_origin: HeaderValue,
}

impl ServerConfig {
    /// Create a new ServerConfig from environment variables
    ///
    /// # Environment Variables
    /// - `HR_BIND_ADDRESS`: listen address (default: `0.0.0.0:4000`)
    /// - `HR_SEED_DEFAULT_USERS`: `true`/`false` (default: `true`)
    /// - `CLIENT_ORIGIN`: origin allowed by CORS (default: `http://localhost:5173`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_address =
            env::var("HR_BIND_ADDRESS").unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = raw_address.parse().map_err(|_| ConfigError::Invalid {
            name: "HR_BIND_ADDRESS",
            value: raw_address.clone(),
        })?;

        let seed_default_users = match env::var("HR_SEED_DEFAULT_USERS") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::Invalid {
                name: "HR_SEED_DEFAULT_USERS",
                value: raw,
            })?,
            Err(_) => true,
        };

        let raw_origin =
            env::var("CLIENT_ORIGIN").unwrap_or_else(|_| DEFAULT_CLIENT_ORIGIN.to_string());
        let client_origin = HeaderValue::from_str(&raw_origin).map_err(|_| ConfigError::Invalid {
            name: "CLIENT_ORIGIN",
            value: raw_origin.clone(),
        })?;

        Ok(Self {
            bind_address,
            seed_default_users,
            client_origin,
        })
    }

    pub fn cors_layer(&self) -> CorsLayer {
        cors_layer(self.client_origin.clone())
    }
}

/// CORS for a single credentialed front-end origin
pub fn cors_layer(origin: HeaderValue) -> CorsLayer {
    info!("CORS: allowing origin {:?}", origin);

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
