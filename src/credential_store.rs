//! Access token persistence
//!
//! The login flow hands the freshly issued access token to a
//! [`CredentialStore`] exactly once, right after a successful token
//! exchange. The core never reads it back.
//!
//! Two implementations are provided:
//!
//! - [`KeyringCredentialStore`] -- the operating system's native credential
//!   store (Keychain on macOS, Secret Service on Linux, Windows Credential
//!   Manager on Windows).
//! - [`MemoryCredentialStore`] -- an in-process map that also records every
//!   write; used as a test double and by embedders that persist elsewhere.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{FsLoginError, Result};

/// Key under which the access token is stored unless configured otherwise.
pub const DEFAULT_ACCESS_TOKEN_KEY: &str = "access_token";

/// Keyring service name used unless configured otherwise.
pub const DEFAULT_KEYRING_SERVICE: &str = "fslogin";

/// Write-only sink for persisting the access token.
pub trait CredentialStore: Send + Sync {
    /// Persists `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`FsLoginError::Keyring`] or
    /// [`FsLoginError::CredentialStore`] if the backend rejects the write.
    fn store(&self, key: &str, value: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// KeyringCredentialStore
// ---------------------------------------------------------------------------

/// Stateless accessor for the OS native keyring.
///
/// Entries are created under the configured service name with the store
/// key as the keyring user, so several keys can live side by side.
///
/// # Examples
///
/// ```no_run
/// use fslogin::credential_store::{CredentialStore, KeyringCredentialStore};
///
/// let store = KeyringCredentialStore::new("fslogin");
/// store.store("access_token", "token-value").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct KeyringCredentialStore {
    service: String,
}

impl KeyringCredentialStore {
    /// Creates a store writing under `service`.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Returns the keyring service name.
    pub fn service(&self) -> &str {
        &self.service
    }
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new(DEFAULT_KEYRING_SERVICE)
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn store(&self, key: &str, value: &str) -> Result<()> {
        let entry = keyring::Entry::new(&self.service, key)?;
        entry.set_password(value)?;
        tracing::debug!(service = %self.service, key, "stored credential in keyring");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryCredentialStore
// ---------------------------------------------------------------------------

/// In-process credential store that records every write.
///
/// # Examples
///
/// ```
/// use fslogin::credential_store::{CredentialStore, MemoryCredentialStore};
///
/// let store = MemoryCredentialStore::new();
/// store.store("access_token", "abc123").unwrap();
///
/// assert_eq!(store.get("access_token").as_deref(), Some("abc123"));
/// assert_eq!(store.write_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<(String, String)>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current value stored under `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .ok()
            .and_then(|values| values.get(key).cloned())
    }

    /// Returns every `(key, value)` write in order.
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes
            .lock()
            .map(|writes| writes.clone())
            .unwrap_or_default()
    }

    /// Returns the number of writes performed.
    pub fn write_count(&self) -> usize {
        self.writes.lock().map(|writes| writes.len()).unwrap_or(0)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn store(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| FsLoginError::CredentialStore("memory store lock poisoned".to_string()))?;
        let mut writes = self
            .writes
            .lock()
            .map_err(|_| FsLoginError::CredentialStore("memory store lock poisoned".to_string()))?;

        values.insert(key.to_string(), value.to_string());
        writes.push((key.to_string(), value.to_string()));
        Ok(())
    }
}
