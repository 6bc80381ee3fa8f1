//! Client-side signup/login/logout orchestration.

use reqwest::StatusCode;
use tracing::{info, warn};

use super::api::{ApiClient, ClientError};
use super::session::{SessionStorage, SessionStore};
use crate::models::{Blog, UserProfile};

const UNAVAILABLE_MESSAGE: &str = "Unable to reach the server. Please try again later.";
const SERVER_MESSAGE: &str = "Something went wrong. Please try again.";
const STORAGE_MESSAGE: &str = "Could not save the session on this device.";
const LOGOUT_STORAGE_MESSAGE: &str = "Could not remove the session from this device.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server rejected the input (400).
    Validation,
    /// Unknown email or wrong password (401).
    InvalidCredentials,
    /// Email already registered (409).
    Conflict,
    /// Server could not be reached.
    Unavailable,
    /// 5xx or an unreadable response.
    Server,
    /// The session could not be saved or removed locally.
    Storage,
}

/// Result of an auth flow. Expected failures carry a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome<T> {
    Success(T),
    Failure { kind: FailureKind, message: String },
}

impl<T> AuthOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success(_))
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            AuthOutcome::Success(_) => None,
            AuthOutcome::Failure { kind, .. } => Some(*kind),
        }
    }

    fn failure(kind: FailureKind, message: &str) -> Self {
        AuthOutcome::Failure {
            kind,
            message: message.to_string(),
        }
    }
}

impl<T> From<ClientError> for AuthOutcome<T> {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Status { status, message } if status.is_client_error() => {
                let kind = match status {
                    StatusCode::UNAUTHORIZED => FailureKind::InvalidCredentials,
                    StatusCode::CONFLICT => FailureKind::Conflict,
                    _ => FailureKind::Validation,
                };
                AuthOutcome::Failure { kind, message }
            }
            ClientError::Transport(e) => {
                warn!(error = %e, "Auth request failed");
                AuthOutcome::failure(FailureKind::Unavailable, UNAVAILABLE_MESSAGE)
            }
            other => {
                warn!(error = %other, "Auth request failed");
                AuthOutcome::failure(FailureKind::Server, SERVER_MESSAGE)
            }
        }
    }
}

/// Talks to the API and keeps the local session in sync with login/logout.
pub struct AuthService<S> {
    api: ApiClient,
    session: SessionStore<S>,
}

impl<S: SessionStorage> AuthService<S> {
    pub fn new(api: ApiClient, storage: S) -> Self {
        Self {
            api,
            session: SessionStore::new(storage),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    /// Register an account. Does not log in.
    pub async fn signup(&self, username: &str, email: &str, password: &str) -> AuthOutcome<()> {
        match self.api.signup(username, email, password).await {
            Ok(user) => {
                info!(user_id = %user.id, "Signed up");
                AuthOutcome::Success(())
            }
            Err(e) => e.into(),
        }
    }

    /// Log in and persist the session.
    pub async fn login(&self, email: &str, password: &str) -> AuthOutcome<UserProfile> {
        let response = match self.api.login(email, password).await {
            Ok(response) => response,
            Err(e) => return e.into(),
        };

        if let Err(e) = self.session.set(&response.token, &response.user) {
            warn!(error = %e, "Failed to persist client session");
            return AuthOutcome::failure(FailureKind::Storage, STORAGE_MESSAGE);
        }

        info!(user_id = %response.user.id, "Logged in");
        AuthOutcome::Success(response.user)
    }

    /// Forget the local session. Issued tokens stay valid until they expire.
    pub fn logout(&self) -> AuthOutcome<()> {
        match self.session.clear() {
            Ok(()) => AuthOutcome::Success(()),
            Err(e) => {
                warn!(error = %e, "Failed to clear client session");
                AuthOutcome::failure(FailureKind::Storage, LOGOUT_STORAGE_MESSAGE)
            }
        }
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.session.current_user()
    }

    pub fn token(&self) -> Option<String> {
        self.session.token()
    }

    fn require_token(&self) -> Result<String, ClientError> {
        self.token().ok_or(ClientError::NotLoggedIn)
    }

    /// Resolve the stored token against the server.
    pub async fn me(&self) -> Result<UserProfile, ClientError> {
        let token = self.require_token()?;
        self.api.me(&token).await
    }

    pub async fn list_blogs(&self) -> Result<Vec<Blog>, ClientError> {
        self.api.list_blogs().await
    }

    pub async fn get_blog(&self, id: &str) -> Result<Blog, ClientError> {
        self.api.get_blog(id).await
    }

    pub async fn create_blog(&self, title: &str, content: &str) -> Result<Blog, ClientError> {
        let token = self.require_token()?;
        self.api.create_blog(&token, title, content).await
    }

    pub async fn update_blog(
        &self,
        id: &str,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Blog, ClientError> {
        let token = self.require_token()?;
        self.api.update_blog(&token, id, title, content).await
    }

    pub async fn delete_blog(&self, id: &str) -> Result<(), ClientError> {
        let token = self.require_token()?;
        self.api.delete_blog(&token, id).await
    }
}
