//! Authentication user types.

use crate::jwt::Claims;

/// Identity resolved from a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// User UUID (the token subject)
    pub user_id: String,
    /// Verified JWT claims
    pub claims: Claims,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub.clone(),
            claims,
        }
    }
}
