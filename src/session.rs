//! Server-side sessions for the delegated login flow.
//!
//! A session id is an opaque, unguessable string handed to the browser as a
//! cookie. The store maps it to the identity resolved at login time. Callers
//! only see the [`SessionStore`] trait so the in-memory map can be swapped for
//! a persistent key-value store.

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::oauth::DelegatedIdentity;

/// Bytes of OS randomness behind every session id.
const SESSION_ID_BYTES: usize = 32;

pub trait SessionStore: Send + Sync {
    /// Insert or replace the identity for `id`.
    fn put(&self, id: &str, identity: DelegatedIdentity);
    fn get(&self, id: &str) -> Option<DelegatedIdentity>;
    /// Remove `id`; unknown ids are ignored.
    fn delete(&self, id: &str);
}

struct SessionEntry {
    identity: DelegatedIdentity,
    created_at: Instant,
}

/// Lock-guarded map living for the process lifetime.
///
/// With a TTL, entries older than the TTL are invisible to `get` and are swept
/// on the next `put`. Without one, entries live until deleted.
pub struct MemorySessionStore {
    ttl: Option<Duration>,
    entries: Mutex<HashMap<String, SessionEntry>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ttl: None,
            entries: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    // A panic while holding the lock cannot leave the map half-written, so a
    // poisoned lock is still safe to use.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_live(&self, entry: &SessionEntry) -> bool {
        self.ttl.map_or(true, |ttl| entry.created_at.elapsed() < ttl)
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for MemorySessionStore {
    fn put(&self, id: &str, identity: DelegatedIdentity) {
        let mut entries = self.entries();
        if self.ttl.is_some() {
            let before = entries.len();
            entries.retain(|_, entry| self.is_live(entry));
            let swept = before - entries.len();
            if swept > 0 {
                debug!(swept, "Expired sessions removed");
            }
        }
        entries.insert(
            id.to_string(),
            SessionEntry {
                identity,
                created_at: Instant::now(),
            },
        );
    }

    fn get(&self, id: &str) -> Option<DelegatedIdentity> {
        let entries = self.entries();
        entries
            .get(id)
            .filter(|entry| self.is_live(entry))
            .map(|entry| entry.identity.clone())
    }

    fn delete(&self, id: &str) {
        self.entries().remove(id);
    }
}

/// Create a new session id: 32 bytes from the OS RNG, URL-safe base64 without padding.
///
/// # Errors
/// Returns an error if the OS random source is unavailable.
pub fn generate_session_id() -> Result<String, rand::Error> {
    random_token::<SESSION_ID_BYTES>()
}

pub(crate) fn random_token<const N: usize>() -> Result<String, rand::Error> {
    let mut bytes = [0u8; N];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}
