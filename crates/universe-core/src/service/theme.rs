//! Theme preference.
//!
//! Stored under the `theme` key next to the session record. It is not part of
//! the session and survives logout.

use tracing::warn;
use universe_types::error::ThemeError;

use crate::session::store::THEME_KEY;
use crate::storage::KvStore;

pub const DEFAULT_THEME: &str = "night";

pub const AVAILABLE_THEMES: [&str; 35] = [
    "light", "dark", "cupcake", "bumblebee", "emerald", "corporate", "synthwave", "retro",
    "cyberpunk", "valentine", "halloween", "garden", "forest", "aqua", "lofi", "pastel",
    "fantasy", "wireframe", "black", "luxury", "dracula", "cmyk", "autumn", "business", "acid",
    "lemonade", "night", "coffee", "winter", "dim", "nord", "sunset", "caramellatte", "abyss",
    "silk",
];

pub fn is_known_theme(name: &str) -> bool {
    AVAILABLE_THEMES.contains(&name)
}

pub struct ThemeService<'a, S> {
    kv: &'a S,
}

impl<'a, S: KvStore> ThemeService<'a, S> {
    pub fn new(kv: &'a S) -> Self {
        Self { kv }
    }

    /// The stored theme, or the default when none is stored or the stored
    /// value is not a known theme.
    pub async fn current(&self) -> Result<String, ThemeError> {
        match self.kv.get(THEME_KEY).await? {
            Some(serde_json::Value::String(name)) if is_known_theme(&name) => Ok(name),
            Some(other) => {
                warn!(value = %other, "ignoring unknown stored theme");
                Ok(DEFAULT_THEME.to_string())
            }
            None => Ok(DEFAULT_THEME.to_string()),
        }
    }

    pub async fn set(&self, name: &str) -> Result<(), ThemeError> {
        if !is_known_theme(name) {
            return Err(ThemeError::Unknown(name.to_string()));
        }
        self.kv.set(THEME_KEY, &serde_json::Value::from(name)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKvStore;

    #[tokio::test]
    async fn defaults_to_night() {
        let kv = MemoryKvStore::new();
        assert_eq!(ThemeService::new(&kv).current().await.unwrap(), "night");
    }

    #[tokio::test]
    async fn set_then_current() {
        let kv = MemoryKvStore::new();
        let themes = ThemeService::new(&kv);

        themes.set("dracula").await.unwrap();
        assert_eq!(themes.current().await.unwrap(), "dracula");
        assert_eq!(kv.get(THEME_KEY).await.unwrap(), Some(serde_json::json!("dracula")));
    }

    #[tokio::test]
    async fn rejects_unknown_theme() {
        let kv = MemoryKvStore::new();
        let err = ThemeService::new(&kv).set("hotdog").await.unwrap_err();
        assert!(matches!(err, ThemeError::Unknown(name) if name == "hotdog"));
        assert!(kv.get(THEME_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_stored_value_falls_back() {
        let kv = MemoryKvStore::new();
        kv.set(THEME_KEY, &serde_json::json!("neon")).await.unwrap();
        assert_eq!(ThemeService::new(&kv).current().await.unwrap(), "night");
    }
}
