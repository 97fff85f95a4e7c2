//! Key-value stores for the session record.
//!
//! `KvStore` uses native async fn in traits and is not object safe, so the
//! backend chosen in `config.toml` is carried by the [`ConfiguredKvStore`]
//! enum rather than a trait object.

pub mod file;
pub mod keychain;

pub use file::FileKvStore;
pub use keychain::KeychainKvStore;

use std::path::Path;

use universe_core::storage::KvStore;
use universe_types::config::StorageBackend;
use universe_types::error::StoreError;

use crate::filesystem::session_dir;

/// The store selected by `[storage] backend`.
#[derive(Debug)]
pub enum ConfiguredKvStore {
    File(FileKvStore),
    Keychain(KeychainKvStore),
}

impl ConfiguredKvStore {
    pub fn open(backend: StorageBackend, data_dir: &Path) -> Self {
        match backend {
            StorageBackend::File => Self::File(FileKvStore::new(session_dir(data_dir))),
            StorageBackend::Keychain => Self::Keychain(KeychainKvStore::new()),
        }
    }

    pub fn backend(&self) -> StorageBackend {
        match self {
            Self::File(_) => StorageBackend::File,
            Self::Keychain(_) => StorageBackend::Keychain,
        }
    }
}

impl KvStore for ConfiguredKvStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        match self {
            Self::File(store) => store.get(key).await,
            Self::Keychain(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        match self {
            Self::File(store) => store.set(key, value).await,
            Self::Keychain(store) => store.set(key, value).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        match self {
            Self::File(store) => store.delete(key).await,
            Self::Keychain(store) => store.delete(key).await,
        }
    }
}
