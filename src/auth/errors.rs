//! Authentication error types.

use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use tracing::debug;

use super::bearer::BEARER_SCHEME;

/// Why a request was rejected. Only used for logging; every kind produces the
/// same response so callers cannot tell which check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// No bearer credential in the request
    MissingCredential,
    /// Signature mismatch, malformed or truncated token
    InvalidToken,
    /// Token is well-formed and signed but past its expiry
    ExpiredToken,
}

/// API authentication error (401 with a generic JSON body).
#[derive(Debug)]
pub struct ApiAuthError {
    pub(super) kind: AuthErrorKind,
}

impl From<AuthErrorKind> for ApiAuthError {
    fn from(kind: AuthErrorKind) -> Self {
        Self { kind }
    }
}

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> Response {
        use axum::Json;
        use serde::Serialize;

        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
        }

        debug!(reason = ?self.kind, "Rejected unauthenticated request");

        let mut response = (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Invalid or missing token",
            }),
        )
            .into_response();

        response.headers_mut().insert(
            header::WWW_AUTHENTICATE,
            HeaderValue::from_static(BEARER_SCHEME),
        );

        response
    }
}
