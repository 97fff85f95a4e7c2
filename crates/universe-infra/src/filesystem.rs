//! Data directory layout.

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "UNIVERSE_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `UNIVERSE_DATA_DIR` environment variable
/// 2. `~/.universe` under the home directory
/// 3. `.universe` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".universe");
    }

    PathBuf::from(".universe")
}

/// Directory holding the file-backed session record: `{data_dir}/session/`.
pub fn session_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("session")
}
