//! File-backed key-value store: one JSON document per key.

use std::path::{Path, PathBuf};

use universe_core::storage::KvStore;
use universe_types::error::StoreError;

/// Stores each key as `{dir}/{key}.json`.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous value intact. On unix the directory is
/// created `0700` and every file `0600`: `authTokens` holds live credentials.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(StoreError::Io(format!("invalid storage key '{key}'")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KvStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let path = self.path_for(key)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(format!("read {}: {e}", path.display()))),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                detail: e.to_string(),
            })
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        create_private_dir(&self.dir)
            .await
            .map_err(|e| StoreError::Io(format!("create {}: {e}", self.dir.display())))?;

        let tmp = path.with_extension("json.tmp");
        write_private(&tmp, value.to_string().as_bytes())
            .await
            .map_err(|e| StoreError::Io(format!("write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StoreError::Io(format!("rename {}: {e}", path.display())))?;
        tracing::debug!(key, "stored value");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(format!("remove {}: {e}", path.display()))),
        }
    }
}

async fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o700);
    builder.create(dir).await
}

async fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use tokio::io::AsyncWriteExt;

    // A leftover from an interrupted write may carry other permissions.
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);
    let mut file = options.open(path).await?;
    file.write_all(contents).await?;
    file.sync_all().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_set_and_get() {
        let dir = tempdir().unwrap();
        let store = FileKvStore::new(dir.path().join("session"));

        store
            .set("authTokens", &json!({ "access": "a.b.c", "refresh": "r" }))
            .await
            .unwrap();
        let value = store.get("authTokens").await.unwrap().unwrap();
        assert_eq!(value["refresh"], "r");
        assert!(!dir.path().join("session").join("authTokens.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let dir = tempdir().unwrap();
        let store = FileKvStore::new(dir.path());
        assert!(store.get("userInfo").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = FileKvStore::new(dir.path());

        store.set("theme", &json!("night")).await.unwrap();
        store.delete("theme").await.unwrap();
        store.delete("theme").await.unwrap();
        assert!(store.get("theme").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_reported() {
        let dir = tempdir().unwrap();
        let store = FileKvStore::new(dir.path());
        tokio::fs::write(dir.path().join("userInfo.json"), "{ not json")
            .await
            .unwrap();

        let err = store.get("userInfo").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { key, .. } if key == "userInfo"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_credentials_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let session_dir = dir.path().join("session");
        let store = FileKvStore::new(&session_dir);
        store
            .set("authTokens", &json!({ "access": "a.b.c", "refresh": "r" }))
            .await
            .unwrap();
        // Overwrites keep the mode too.
        store
            .set("authTokens", &json!({ "access": "d.e.f", "refresh": "r" }))
            .await
            .unwrap();

        let file_mode = std::fs::metadata(session_dir.join("authTokens.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(file_mode & 0o777, 0o600);
        let dir_mode = std::fs::metadata(&session_dir).unwrap().permissions().mode();
        assert_eq!(dir_mode & 0o777, 0o700);
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let dir = tempdir().unwrap();
        let store = FileKvStore::new(dir.path());
        assert!(store.set("../escape", &json!(1)).await.is_err());
    }
}
