//! Key-value store trait.

use universe_types::error::StoreError;

/// Persistent key-value storage for the client's session record.
///
/// Stores arbitrary JSON values by string key (`authTokens`, `userInfo`,
/// `theme`). Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait KvStore: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<serde_json::Value>, StoreError>> + Send;

    /// Set a value for a key (upsert).
    fn set(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Delete a key. No-op if key does not exist.
    fn delete(&self, key: &str) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
