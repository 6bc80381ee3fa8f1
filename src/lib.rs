pub mod api;
pub mod auth;
pub mod cli;
pub mod client;
pub mod db;
pub mod jwt;
pub mod models;
pub mod password;

use api::create_api_router;
use axum::Router;
use db::Database;
use jwt::JwtConfig;
use password::CredentialHasher;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Base path for all routes (e.g., "/api"). `None` serves at the root.
    pub base: Option<String>,
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// JWT secret for signing tokens
    pub jwt_secret: Vec<u8>,
    /// Lifetime of issued bearer tokens
    pub token_ttl: Duration,
    /// Password hasher built from the configured Argon2 cost
    pub hasher: CredentialHasher,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    // The secret is fixed for the lifetime of the router
    let jwt = Arc::new(JwtConfig::new(&config.jwt_secret));
    let api_router = create_api_router(
        config.db.clone(),
        jwt,
        config.hasher.clone(),
        config.token_ttl,
    );

    match config.base.as_deref() {
        Some(base) if !base.is_empty() && base != "/" => Router::new().nest(base, api_router),
        _ => api_router,
    }
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    axum::serve(listener, app).await
}

/// Start the server on the given port in a background task. Use port 0 to let the OS choose a random port.
/// Returns the actual address the server is listening on.
/// Note: For production use, prefer `run_server` directly in main.
pub async fn start_server(
    config: ServerConfig,
    port: u16,
) -> Result<(tokio::task::JoinHandle<()>, SocketAddr), std::io::Error> {
    let addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = run_server(config, listener).await {
            tracing::error!(error = %e, "Server error");
        }
    });

    Ok((handle, local_addr))
}
