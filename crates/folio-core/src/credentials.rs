//! Credential store backed by a static JSON file.
//!
//! The file maps usernames to Argon2 PHC hash strings:
//!
//! ```json
//! { "admin": "$argon2id$v=19$m=19456,t=3,p=1$..." }
//! ```
//!
//! The server only ever reads it, and re-reads it on every sign-in attempt
//! so edits take effect without a restart. The `folio` CLI writes it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use rand::rngs::OsRng;
use tracing::debug;

use crate::error::CredentialError;

// Argon2id cost parameters for newly hashed passwords. Verification reads
// the parameters embedded in each stored hash instead.
const MEMORY_COST_KIB: u32 = 19 * 1024;
const TIME_COST: u32 = 3;
const PARALLELISM: u32 = 1;

fn argon2_config() -> Result<Argon2<'static>, CredentialError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)
        .map_err(|e| CredentialError::Hash { reason: e.to_string() })?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a plaintext password with Argon2id and return the PHC string.
///
/// # Errors
///
/// Returns [`CredentialError::Hash`] if the hasher rejects its input.
pub fn hash_password(plaintext: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2_config()?
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| CredentialError::Hash { reason: e.to_string() })?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC hash string.
///
/// A stored value that is not a valid PHC string never verifies.
#[must_use]
pub fn verify_password(plaintext: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

/// Username to password-hash mapping stored in a JSON file.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Location of the credentials file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every credential record.
    ///
    /// # Errors
    ///
    /// - [`CredentialError::Read`] if the file cannot be read.
    /// - [`CredentialError::Parse`] if it is not a JSON object of strings.
    pub async fn load(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| CredentialError::Read {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })?;

        serde_json::from_slice(&bytes).map_err(|e| CredentialError::Parse {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Load the records, or an empty mapping if the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), except a missing file is not an error.
    pub async fn load_or_empty(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        if tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            self.load().await
        } else {
            Ok(BTreeMap::new())
        }
    }

    /// Replace the file with the given records, pretty-printed and sorted.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Write`] if the file cannot be written.
    pub async fn save(&self, users: &BTreeMap<String, String>) -> Result<(), CredentialError> {
        let mut body = serde_json::to_vec_pretty(users).map_err(|e| CredentialError::Write {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        body.push(b'\n');

        tokio::fs::write(&self.path, body)
            .await
            .map_err(|e| CredentialError::Write {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })
    }

    /// Check a sign-in attempt against the stored hash for `username`.
    ///
    /// Returns `Ok(false)` for unknown users and wrong passwords. Only the
    /// record for `username` is consulted. Hash verification runs on the
    /// blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns an error only when the file cannot be loaded or the blocking
    /// task fails; a rejected attempt is not an error.
    pub async fn validate(&self, username: &str, password: &str) -> Result<bool, CredentialError> {
        let mut users = self.load().await?;
        let Some(stored_hash) = users.remove(username) else {
            debug!(username, "sign-in attempt for unknown user");
            return Ok(false);
        };

        let password = password.to_owned();
        tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| CredentialError::Join {
                reason: e.to_string(),
            })
    }
}
