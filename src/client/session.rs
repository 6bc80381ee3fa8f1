//! Local persistence of the client session.
//!
//! The session is a single JSON record `{token, user}`. It is overwritten
//! wholesale on login and removed on logout. Unreadable or corrupt records
//! read as "no session".

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

use crate::models::UserProfile;

/// Token plus the minimal user projection returned by login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSession {
    pub token: String,
    pub user: UserProfile,
}

/// Raw key-value slot the session is stored in.
pub trait SessionStorage: Send + Sync {
    /// Read the stored record, `None` if nothing is stored.
    fn load(&self) -> io::Result<Option<String>>;
    /// Replace the stored record.
    fn save(&self, value: &str) -> io::Result<()>;
    /// Remove the stored record. Removing an absent record is not an error.
    fn clear(&self) -> io::Result<()>;
}

/// Session stored in a JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling of the session file with `.tmp` appended to the full name.
    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Options for a new file readable only by its owner.
fn owner_only_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
}

impl SessionStorage for FileStorage {
    fn load(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, value: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        // Write then rename so readers never see a half-written record
        let tmp = self.tmp_path();
        match std::fs::remove_file(&tmp) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        let mut file = owner_only_options().open(&tmp)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        drop(file);

        std::fs::rename(&tmp, &self.path)
    }

    fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Session kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryStorage {
    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.slot().clone())
    }

    fn save(&self, value: &str) -> io::Result<()> {
        *self.slot() = Some(value.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.slot() = None;
        Ok(())
    }
}

/// Typed access to the persisted client session.
pub struct SessionStore<S> {
    storage: S,
}

impl<S: SessionStorage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Replace the current session.
    pub fn set(&self, token: &str, user: &UserProfile) -> io::Result<()> {
        let session = ClientSession {
            token: token.to_string(),
            user: user.clone(),
        };
        let json = serde_json::to_string(&session).map_err(io::Error::other)?;
        self.storage.save(&json)
    }

    /// Remove the current session.
    pub fn clear(&self) -> io::Result<()> {
        self.storage.clear()
    }

    /// Read the current session. Storage errors and corrupt records yield `None`.
    pub fn current(&self) -> Option<ClientSession> {
        let raw = match self.storage.load() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read client session");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(error = %e, "Ignoring corrupt client session");
                None
            }
        }
    }

    pub fn token(&self) -> Option<String> {
        self.current().map(|s| s.token)
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.current().map(|s| s.user)
    }
}
