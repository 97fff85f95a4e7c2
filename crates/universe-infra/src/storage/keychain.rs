//! OS keychain adapter for the session record.
//!
//! Uses the `keyring` crate to store values via:
//! - macOS Keychain
//! - Linux Secret Service (GNOME Keyring, KDE Wallet)
//! - Windows Credential Manager
//!
//! Each key is one keychain entry whose password is the JSON-encoded value.

use universe_core::storage::KvStore;
use universe_types::error::StoreError;

/// OS keychain key-value store.
#[derive(Debug)]
pub struct KeychainKvStore {
    service_name: String,
}

impl KeychainKvStore {
    /// Create a store with the default service name "universe".
    pub fn new() -> Self {
        Self::with_service("universe")
    }

    /// Create a store with a custom service name (useful for testing).
    pub fn with_service(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry, StoreError> {
        keyring::Entry::new(&self.service_name, key)
            .map_err(|e| StoreError::Unavailable(format!("keychain entry error: {e}")))
    }
}

impl Default for KeychainKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for KeychainKvStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let entry = self.entry(key)?;

        let raw = match entry.get_password() {
            Ok(value) => value,
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(e) => return Err(StoreError::Unavailable(format!("keychain get error: {e}"))),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                detail: e.to_string(),
            })
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        let entry = self.entry(key)?;

        entry
            .set_password(&value.to_string())
            .map_err(|e| StoreError::Unavailable(format!("keychain set error: {e}")))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let entry = self.entry(key)?;

        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StoreError::Unavailable(format!("keychain delete error: {e}"))),
        }
    }
}
