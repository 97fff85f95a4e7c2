//! Typed access to the persisted session record.

use universe_types::auth::TokenPair;
use universe_types::error::StoreError;
use universe_types::user::UserSnapshot;

use crate::storage::KvStore;

pub const AUTH_TOKENS_KEY: &str = "authTokens";
pub const USER_INFO_KEY: &str = "userInfo";
pub const THEME_KEY: &str = "theme";

/// Reads and writes the session keys of a [`KvStore`].
pub struct SessionStore<S> {
    kv: S,
}

impl<S: KvStore> SessionStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    pub async fn load_tokens(&self) -> Result<Option<TokenPair>, StoreError> {
        self.load(AUTH_TOKENS_KEY).await
    }

    pub async fn save_tokens(&self, tokens: &TokenPair) -> Result<(), StoreError> {
        self.save(AUTH_TOKENS_KEY, tokens).await
    }

    pub async fn load_user(&self) -> Result<Option<UserSnapshot>, StoreError> {
        self.load(USER_INFO_KEY).await
    }

    pub async fn save_user(&self, user: &UserSnapshot) -> Result<(), StoreError> {
        self.save(USER_INFO_KEY, user).await
    }

    /// Remove credentials and the user snapshot.
    ///
    /// Both deletes are attempted even if the first fails; the first error is
    /// returned.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let tokens = self.kv.delete(AUTH_TOKENS_KEY).await;
        let user = self.kv.delete(USER_INFO_KEY).await;
        tokens.and(user)
    }

    async fn load<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(value) = self.kv.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                detail: e.to_string(),
            })
    }

    async fn save<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(value).map_err(|e| StoreError::Io(e.to_string()))?;
        self.kv.set(key, &value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKvStore;

    #[tokio::test]
    async fn tokens_round_trip_under_auth_tokens_key() {
        let store = SessionStore::new(MemoryKvStore::new());
        let pair = TokenPair {
            access: "a".to_string(),
            refresh: "r".to_string(),
        };
        store.save_tokens(&pair).await.unwrap();

        let raw = store.kv().get(AUTH_TOKENS_KEY).await.unwrap().unwrap();
        assert_eq!(raw, serde_json::json!({"access": "a", "refresh": "r"}));
        assert_eq!(store.load_tokens().await.unwrap().unwrap().refresh, "r");
    }

    #[tokio::test]
    async fn corrupt_record_is_reported() {
        let store = SessionStore::new(MemoryKvStore::new());
        store
            .kv()
            .set(AUTH_TOKENS_KEY, &serde_json::json!("garbage"))
            .await
            .unwrap();

        let err = store.load_tokens().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref key, .. } if key == AUTH_TOKENS_KEY));
    }

    #[tokio::test]
    async fn clear_removes_tokens_and_user_but_keeps_theme() {
        let store = SessionStore::new(MemoryKvStore::new());
        store.kv().set(AUTH_TOKENS_KEY, &serde_json::json!({})).await.unwrap();
        store.kv().set(USER_INFO_KEY, &serde_json::json!({})).await.unwrap();
        store.kv().set(THEME_KEY, &serde_json::json!("dark")).await.unwrap();

        store.clear().await.unwrap();

        assert!(store.kv().get(AUTH_TOKENS_KEY).await.unwrap().is_none());
        assert!(store.kv().get(USER_INFO_KEY).await.unwrap().is_none());
        assert!(store.kv().get(THEME_KEY).await.unwrap().is_some());
    }
}
