mod auth;
mod blogs;
mod error;

use axum::{Json, Router, routing::get};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::db::Database;
use crate::jwt::JwtConfig;
use crate::password::CredentialHasher;

pub use auth::AuthState;
pub use blogs::BlogsState;
pub use error::ApiError;

/// Create the API router.
pub fn create_api_router(
    db: Database,
    jwt: Arc<JwtConfig>,
    hasher: CredentialHasher,
    token_ttl: Duration,
) -> Router {
    let auth_state = auth::AuthState {
        db: db.clone(),
        jwt: jwt.clone(),
        hasher,
        token_ttl,
    };

    let blogs_state = blogs::BlogsState { db, jwt };

    Router::new()
        .route("/health", get(|| async { Json(json!({ "ok": true })) }))
        .nest("/auth", auth::router(auth_state))
        .nest("/blogs", blogs::router(blogs_state))
}
