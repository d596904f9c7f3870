use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod authenticator;
mod config;
mod error;
mod jwt;
mod middleware;
mod models;
mod ownership;
mod password;
mod permissions;
mod repositories;
mod routes;
mod seed;
mod session;
mod state;
mod validation;

#[cfg(test)]
mod test_support;

use common::database::{self, DatabaseConfig};

use crate::{config::ServerConfig, jwt::JwtConfig, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting HR service");

    let server_config = ServerConfig::from_env()?;
    let jwt_config = JwtConfig::from_env();

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::init_schema(&pool).await?;

    let app_state = AppState::new(pool, &jwt_config);

    if server_config.seed_default_users {
        seed::ensure_default_users(&app_state).await?;
    }
    seed::migrate_default_permissions(&app_state).await?;

    info!("HR service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state, server_config.cors_layer());

    let listener = TcpListener::bind(server_config.bind_address).await?;
    info!("HR service listening on {}", server_config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
