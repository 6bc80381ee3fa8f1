//! Password hashing with Argon2id.
//!
//! Digests are PHC strings carrying their own salt and cost parameters, so a
//! digest produced under one configuration still verifies after the cost is
//! raised.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

const SALT_LEN: usize = 16;
const PLACEHOLDER_PASSWORD: &str = "placeholder-password-for-absent-accounts";

/// Validated Argon2 cost parameters.
#[derive(Debug, Clone)]
pub struct PasswordConfig {
    params: Params,
}

impl PasswordConfig {
    /// Build a cost configuration. Fails if the parameters are out of range
    /// (e.g. memory below 8 KiB per lane).
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(PasswordError::Params)?;
        Ok(Self { params })
    }

    pub fn memory_kib(&self) -> u32 {
        self.params.m_cost()
    }

    pub fn iterations(&self) -> u32 {
        self.params.t_cost()
    }

    pub fn parallelism(&self) -> u32 {
        self.params.p_cost()
    }
}

impl Default for PasswordConfig {
    /// 19 MiB, 2 iterations, 1 lane.
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

/// Hashes and verifies user passwords.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    /// Digest checked for logins to accounts that do not exist.
    placeholder_digest: Arc<str>,
    verifications: Arc<AtomicU64>,
}

impl CredentialHasher {
    /// Build a hasher for `config`. Hashes one placeholder password up front.
    pub fn new(config: &PasswordConfig) -> Result<Self, PasswordError> {
        let mut hasher = Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, config.params.clone()),
            placeholder_digest: Arc::from(""),
            verifications: Arc::new(AtomicU64::new(0)),
        };
        hasher.placeholder_digest = Arc::from(hasher.hash(PLACEHOLDER_PASSWORD)?);
        Ok(hasher)
    }

    /// Number of digest checks run by this hasher and its clones.
    pub fn verifications(&self) -> u64 {
        self.verifications.load(Ordering::Relaxed)
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let mut salt_bytes = [0u8; SALT_LEN];
        rand::RngCore::fill_bytes(&mut rand::rng(), &mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes).map_err(PasswordError::Hashing)?;

        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(PasswordError::Hashing)?
            .to_string();
        Ok(hash)
    }

    /// Check a password against a stored digest.
    ///
    /// A mismatch is `false`, not an error. Unparseable digests are also
    /// `false`.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        self.verifications.fetch_add(1, Ordering::Relaxed);

        let parsed = match PasswordHash::new(digest) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Stored password digest is malformed");
                return false;
            }
        };

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => true,
            Err(argon2::password_hash::Error::Password) => false,
            Err(e) => {
                warn!(error = %e, "Password verification failed");
                false
            }
        }
    }

    /// Hash on the blocking thread pool so request workers stay free.
    pub async fn hash_blocking(&self, plaintext: String) -> Result<String, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|_| PasswordError::TaskFailed)?
    }

    /// Verify on the blocking thread pool so request workers stay free.
    pub async fn verify_blocking(
        &self,
        plaintext: String,
        digest: String,
    ) -> Result<bool, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &digest))
            .await
            .map_err(|_| PasswordError::TaskFailed)
    }

    /// Burn one verification for a login whose account does not exist.
    pub async fn verify_absent_blocking(&self, plaintext: String) -> Result<(), PasswordError> {
        let digest = self.placeholder_digest.to_string();
        self.verify_blocking(plaintext, digest).await?;
        Ok(())
    }
}

/// Errors that can occur while hashing.
#[derive(Debug)]
pub enum PasswordError {
    /// Cost parameters out of range
    Params(argon2::Error),
    /// Salt encoding or hashing failed
    Hashing(argon2::password_hash::Error),
    /// The blocking task panicked or was cancelled
    TaskFailed,
}

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PasswordError::Params(e) => write!(f, "Invalid password hashing parameters: {}", e),
            PasswordError::Hashing(e) => write!(f, "Failed to hash password: {}", e),
            PasswordError::TaskFailed => write!(f, "Password hashing task failed"),
        }
    }
}

impl std::error::Error for PasswordError {}
