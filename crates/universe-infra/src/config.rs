//! Client configuration loader for UniVerse.
//!
//! Reads `config.toml` from the data directory (`~/.universe/` in production)
//! and deserializes it into [`ClientConfig`]. Falls back to sensible defaults
//! when the file is missing or malformed.

use std::path::Path;

use universe_types::config::ClientConfig;
use url::Url;

/// Environment variable overriding `api_base_url`.
pub const API_URL_ENV: &str = "UNIVERSE_API_URL";

/// Load client configuration from `{data_dir}/config.toml`, then apply
/// environment overrides.
///
/// - If the file does not exist, the defaults are used.
/// - If the file exists but fails to parse, logs a warning and uses the defaults.
/// - `UNIVERSE_API_URL`, when set to a valid URL, replaces `api_base_url`.
pub async fn load_client_config(data_dir: &Path) -> ClientConfig {
    let config = read_config_file(data_dir).await;
    apply_api_url_override(config, std::env::var(API_URL_ENV).ok().as_deref())
}

async fn read_config_file(data_dir: &Path) -> ClientConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ClientConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ClientConfig::default();
        }
    };

    match toml::from_str::<ClientConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ClientConfig::default()
        }
    }
}

/// Replace the API base URL with `value` when it parses. An invalid value is
/// ignored with a warning.
pub fn apply_api_url_override(mut config: ClientConfig, value: Option<&str>) -> ClientConfig {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return config;
    };
    match Url::parse(value) {
        Ok(url) => config.api_base_url = url,
        Err(err) => tracing::warn!("Ignoring {API_URL_ENV}={value}: {err}"),
    }
    config
}
