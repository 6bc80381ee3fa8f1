//! Signup, login and identity lookup.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::error::{ApiError, ResultExt, parse_body, required_text};
use crate::auth::Auth;
use crate::db::{Database, is_unique_violation};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;
use crate::models::{LoginResponse, UserProfile};
use crate::password::CredentialHasher;

const MAX_USERNAME_LEN: usize = 64;
const MAX_EMAIL_LEN: usize = 254;
const MAX_PASSWORD_LEN: usize = 1024;

/// Same message for unknown email and wrong password.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Clone)]
pub struct AuthState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub hasher: CredentialHasher,
    pub token_ttl: Duration,
}

impl_has_auth_backend!(AuthState);

pub fn router(state: AuthState) -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/me", get(me))
        .with_state(state)
}

#[derive(Deserialize)]
struct SignupRequest {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize)]
struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

/// Passwords are not trimmed; only emptiness is rejected.
fn required_password(value: Option<String>) -> Option<String> {
    value.filter(|p| !p.is_empty())
}

async fn signup(
    State(state): State<AuthState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = parse_body(payload)?;

    let (Some(username), Some(email), Some(password)) = (
        required_text(payload.username),
        required_text(payload.email),
        required_password(payload.password),
    ) else {
        return Err(ApiError::bad_request("Missing fields"));
    };

    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(ApiError::bad_request(format!(
            "Username cannot be longer than {} characters",
            MAX_USERNAME_LEN
        )));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(ApiError::bad_request("Email is too long"));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(ApiError::bad_request("Password is too long"));
    }

    let exists = state
        .db
        .users()
        .email_exists(&email)
        .await
        .db_err("Failed to check email availability")?;

    if exists {
        return Err(ApiError::conflict("Email already registered"));
    }

    let password_hash = state
        .hasher
        .hash_blocking(password)
        .await
        .internal_err("Failed to hash password")?;

    let uuid = uuid::Uuid::new_v4().to_string();

    match state
        .db
        .users()
        .create(&uuid, &username, &email, &password_hash)
        .await
    {
        Ok(_) => {}
        // Lost a race with a concurrent signup for the same email
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::conflict("Email already registered"));
        }
        Err(e) => return Err(ApiError::db_error("Failed to create user", e)),
    }

    info!(user = %uuid, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(UserProfile {
            id: uuid,
            username,
            email,
        }),
    ))
}

async fn login(
    State(state): State<AuthState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = parse_body(payload)?;

    let (Some(email), Some(password)) = (
        required_text(payload.email),
        required_password(payload.password),
    ) else {
        return Err(ApiError::bad_request("Missing fields"));
    };

    let Some(user) = state
        .db
        .users()
        .get_by_email(&email)
        .await
        .db_err("Failed to get user")?
    else {
        // Unknown email costs the same as a wrong password
        state
            .hasher
            .verify_absent_blocking(password)
            .await
            .internal_err("Failed to verify password")?;
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    let valid = state
        .hasher
        .verify_blocking(password, user.password_hash.clone())
        .await
        .internal_err("Failed to verify password")?;

    if !valid {
        info!(user = %user.uuid, "Login rejected");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let issued = state
        .jwt
        .issue(&user.uuid, state.token_ttl)
        .internal_err("Failed to issue token")?;

    info!(user = %user.uuid, expires_at = issued.expires_at, "User logged in");

    Ok(Json(LoginResponse {
        token: issued.token,
        user: UserProfile::from(user),
    }))
}

async fn me(
    State(state): State<AuthState>,
    Auth(auth): Auth,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .users()
        .get_by_uuid(&auth.user_id)
        .await
        .db_err("Failed to get user")?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserProfile::from(user)))
}
