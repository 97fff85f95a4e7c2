//! Client configuration types for UniVerse.
//!
//! `ClientConfig` represents the top-level `config.toml` that points the
//! client at a backend and tunes the realtime channel and storage backend.

use serde::{Deserialize, Serialize};
use url::Url;

use std::fmt;

/// Top-level configuration for the UniVerse client.
///
/// Loaded from `~/.universe/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the REST backend.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: Url,

    /// Base URL of the WebSocket endpoints. Derived from `api_base_url` when unset.
    #[serde(default)]
    pub ws_base_url: Option<Url>,

    /// Per-request timeout for REST calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_api_base_url() -> Url {
    Url::parse("http://localhost:8000").expect("static URL is valid")
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            ws_base_url: None,
            request_timeout_secs: default_request_timeout_secs(),
            chat: ChatConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl ClientConfig {
    /// The WebSocket base URL: explicit `ws_base_url`, or the API base with
    /// `http` mapped to `ws` and `https` mapped to `wss`.
    pub fn websocket_base(&self) -> Url {
        if let Some(url) = &self.ws_base_url {
            return url.clone();
        }
        let mut url = self.api_base_url.clone();
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        // http(s) -> ws(s) is always a valid special-scheme switch.
        let _ = url.set_scheme(scheme);
        url
    }
}

/// Realtime chat channel tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Reconnection attempts after an unexpected closure.
    #[serde(default = "default_reconnect_attempts")]
    pub reconnect_attempts: u32,

    /// Delay between attempts (base delay for exponential backoff).
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,

    #[serde(default)]
    pub backoff: BackoffKind,
}

fn default_reconnect_attempts() -> u32 {
    10
}

fn default_reconnect_interval_ms() -> u64 {
    3_000
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            reconnect_attempts: default_reconnect_attempts(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
            backoff: BackoffKind::default(),
        }
    }
}

/// Delay strategy between reconnection attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    #[default]
    Fixed,
    Exponential,
}

/// Where the session record (credentials, user snapshot, theme) is kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON files under the data directory.
    #[default]
    File,
    /// OS keychain (macOS Keychain / Linux Secret Service / Windows Credential Manager).
    Keychain,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::File => write!(f, "file"),
            StorageBackend::Keychain => write!(f, "keychain"),
        }
    }
}
