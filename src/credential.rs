//! Password verification against stored bcrypt hashes.
//!
//! Plaintext passwords are only ever passed to bcrypt; they are never logged,
//! stored, or echoed back.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

/// Compared against when the username is unknown so that both failure paths
/// cost one bcrypt verification.
const UNKNOWN_USER_HASH: &str = "$2b$10$WsJvNPe/rdFggqJROZvXaOY/RwOH3CsNeYbrHq0QgVXoXYvhXeFbG";

const ADMIN_HASH: &str = "$2a$10$PjX0.82.3nj1DaU6NIT69.TPw0tFIcInCLmoIliTh6G0tarecAFXu";
const USER1_HASH: &str = "$2a$10$RUvcffqE1ajH4Akl3jekjOninMA/JTkuSrVWbsxSinfCS5T8XT/0C";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    /// Unknown user and wrong password are deliberately the same error.
    #[error("invalid username or password")]
    InvalidCredential,
}

/// Read-only user record. Holds a one-way hash, never a plaintext password.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credential {
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    password_hash: String,
}

impl Credential {
    #[must_use]
    pub fn new(
        id: u64,
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
        }
    }

    #[must_use]
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"***")
            .finish()
    }
}

/// Check `presented` against a bcrypt `stored_hash`.
///
/// Malformed hashes never match. bcrypt compares digests in constant time.
#[must_use]
pub fn verify(stored_hash: &str, presented: &str) -> bool {
    match bcrypt::verify(presented, stored_hash) {
        Ok(valid) => valid,
        Err(err) => {
            warn!("Stored password hash is unusable: {err}");
            false
        }
    }
}

/// Username-indexed credential registry.
#[derive(Clone, Debug, Default)]
pub struct CredentialStore {
    users: HashMap<String, Credential>,
}

impl CredentialStore {
    #[must_use]
    pub fn new(credentials: impl IntoIterator<Item = Credential>) -> Self {
        Self {
            users: credentials
                .into_iter()
                .map(|credential| (credential.username.clone(), credential))
                .collect(),
        }
    }

    /// `admin` / `admin123` and `user1` / `user123`.
    #[must_use]
    pub fn with_reference_users() -> Self {
        Self::new([
            Credential::new(1, "admin", "admin@example.com", ADMIN_HASH),
            Credential::new(2, "user1", "user1@example.com", USER1_HASH),
        ])
    }

    #[must_use]
    pub fn find(&self, username: &str) -> Option<&Credential> {
        self.users.get(username)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Verify a username/password pair off the async runtime.
    ///
    /// # Errors
    /// Returns [`CredentialError::InvalidCredential`] for unknown users and wrong
    /// passwords alike.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Credential, CredentialError> {
        let candidate = self.find(username).cloned();
        let hash = candidate
            .as_ref()
            .map_or_else(|| UNKNOWN_USER_HASH.to_string(), |c| c.password_hash.clone());
        let password = password.to_string();

        let valid = match tokio::task::spawn_blocking(move || verify(&hash, &password)).await {
            Ok(valid) => valid,
            Err(err) => {
                error!("Password verification task failed: {err}");
                false
            }
        };

        match candidate {
            Some(credential) if valid => Ok(credential),
            _ => Err(CredentialError::InvalidCredential),
        }
    }
}
