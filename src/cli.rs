//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::db::Database;
use crate::password::{CredentialHasher, PasswordConfig};
use clap::Parser;
use std::time::Duration;
use tracing::{error, info};

const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "Chronicle", about = "Blog API with bearer-token authentication")]
pub struct Args {
    /// Base path prefix for all routes (e.g. "/api")
    #[arg(short, long, value_parser = validate_base_path)]
    pub base: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, env = "DATABASE_PATH", default_value = "chronicle.db")]
    pub database: String,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Lifetime of issued tokens in hours
    #[arg(long, default_value = "168", value_parser = clap::value_parser!(u64).range(1..))]
    pub token_ttl_hours: u64,

    /// Argon2 memory cost in KiB
    #[arg(long, default_value = "19456")]
    pub hash_memory_kib: u32,

    /// Argon2 iteration count
    #[arg(long, default_value = "2")]
    pub hash_iterations: u32,

    /// Argon2 parallelism (lanes)
    #[arg(long, default_value = "1")]
    pub hash_parallelism: u32,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

fn validate_base_path(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Ok(String::new());
    }

    if !s.starts_with('/') {
        return Err(format!("Base path must start with '/': {}", s));
    }

    if s.len() > 1 && s.ends_with('/') {
        return Err(format!("Base path must not end with '/': {}", s));
    }

    if s.chars().any(|c| !c.is_ascii() || c.is_whitespace()) {
        return Err(format!("Base path contains invalid characters: {}", s));
    }

    Ok(s.to_string())
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        secret
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!(
            "JWT secret is required. Set JWT_SECRET environment variable (recommended) or use --jwt-secret-file"
        );
        return None;
    };

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        error!(
            "JWT secret is shorter than {} characters. Use a longer secret",
            MIN_JWT_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Validate the Argon2 cost flags and build the password hasher.
/// Returns None and logs an error if they are out of range.
pub fn load_hasher(args: &Args) -> Option<CredentialHasher> {
    let hasher = PasswordConfig::new(
        args.hash_memory_kib,
        args.hash_iterations,
        args.hash_parallelism,
    )
    .and_then(|config| CredentialHasher::new(&config));

    match hasher {
        Ok(hasher) => Some(hasher),
        Err(e) => {
            error!(error = %e, "Failed to set up password hashing");
            None
        }
    }
}

/// Build ServerConfig from validated arguments.
pub fn build_config(
    base: Option<String>,
    db: Database,
    jwt_secret: String,
    token_ttl_hours: u64,
    hasher: CredentialHasher,
) -> ServerConfig {
    ServerConfig {
        base,
        db,
        jwt_secret: jwt_secret.into_bytes(),
        token_ttl: Duration::from_secs(token_ttl_hours.saturating_mul(60 * 60)),
        hasher,
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}
