//! Axum extractors for authentication.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use tracing::debug;

use super::bearer::get_bearer_token;
use super::errors::{ApiAuthError, AuthErrorKind};
use super::state::HasAuthBackend;
use super::types::AuthenticatedUser;
use crate::jwt::JwtConfig;

/// Resolve the caller's identity from the request headers.
///
/// Missing credential and failed verification are both rejections; the
/// distinction only reaches the debug log via `ApiAuthError`.
pub fn authenticate_request(
    headers: &HeaderMap,
    jwt: &JwtConfig,
) -> Result<AuthenticatedUser, AuthErrorKind> {
    let token = get_bearer_token(headers).ok_or(AuthErrorKind::MissingCredential)?;

    match jwt.verify(token) {
        Ok(claims) => Ok(AuthenticatedUser::from(claims)),
        Err(e) if e.is_expired() => Err(AuthErrorKind::ExpiredToken),
        Err(e) => {
            debug!(error = %e, "Token verification failed");
            Err(AuthErrorKind::InvalidToken)
        }
    }
}

/// Extractor for endpoints that require authentication.
///
/// On success the resolved user is also stored in the request extensions so
/// later extractors and layers can read it without re-verifying.
pub struct Auth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for Auth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(Auth(user.clone()));
        }

        let user = authenticate_request(&parts.headers, state.jwt()).map_err(ApiAuthError::from)?;
        parts.extensions.insert(user.clone());
        Ok(Auth(user))
    }
}
