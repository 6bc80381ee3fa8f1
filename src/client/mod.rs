//! Client for the Chronicle API with local session persistence.

mod api;
mod service;
mod session;

pub use api::{ApiClient, ClientError, DEFAULT_TIMEOUT};
pub use service::{AuthOutcome, AuthService, FailureKind};
pub use session::{ClientSession, FileStorage, MemoryStorage, SessionStorage, SessionStore};
