//! Bearer-token authentication and ownership checks.
//!
//! Tokens are stateless JWTs presented in the `Authorization` header. The
//! `Auth` extractor is the only place requests are authenticated; handlers
//! receive the resolved user and consult `authorize` before mutating.

mod bearer;
mod errors;
mod extractors;
mod ownership;
mod state;
mod types;

pub use bearer::{BEARER_SCHEME, get_bearer_token};
pub use errors::{ApiAuthError, AuthErrorKind};
pub use extractors::{Auth, authenticate_request};
pub use ownership::{Action, Decision, authorize};
pub use state::HasAuthBackend;
pub use types::AuthenticatedUser;
