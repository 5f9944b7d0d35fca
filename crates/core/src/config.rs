//! Application configuration.
//!
//! Settings are read from `config.toml` under the user's config directory
//! (e.g. `~/.config/qkart/config.toml`) with `QKART_*` environment
//! variables layered on top. A commented default file is written on first
//! run so the backend endpoint is easy to find and change.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

/// Directory under the user config root holding QKart files.
pub const CONFIG_DIR: &str = "qkart";

const CONFIG_FILE: &str = "config.toml";

const DEFAULT_ENDPOINT: &str = "http://localhost:8082/api/v1";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;

const DEFAULT_CONFIG: &str = r#"# QKart terminal client configuration.

# Base URL of the QKart backend API, without a trailing slash.
endpoint = "http://localhost:8082/api/v1"

# Seconds before an in-flight request is abandoned.
request_timeout_secs = 10

# Quiet window for search-as-you-type, in milliseconds.
search_debounce_ms = 500
"#;

/// Runtime configuration for the client.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Base URL of the backend API.
    pub endpoint: String,
    /// Client-wide request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Debounce quiet window for search-as-you-type, in milliseconds.
    pub search_debounce_ms: u64,
    /// Override for the session file location, mainly for tests.
    #[serde(default)]
    pub session_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from the default file location plus `QKART_*`
    /// environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load configuration from an explicit file path. The file may be
    /// missing; defaults and environment overrides still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let builder = Config::builder()
            .set_default("endpoint", DEFAULT_ENDPOINT)?
            .set_default("request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS)?
            .set_default("search_debounce_ms", DEFAULT_SEARCH_DEBOUNCE_MS)?
            .add_source(
                File::from(path.as_ref())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::with_prefix("QKART"));

        let config = builder.build().context("failed to assemble configuration")?;
        let mut parsed: Self = config
            .try_deserialize()
            .context("failed to parse configuration")?;
        while parsed.endpoint.ends_with('/') {
            parsed.endpoint.pop();
        }
        Ok(parsed)
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Search debounce window as a [`Duration`].
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

/// Default path of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Write the commented default configuration if no file exists yet.
pub fn ensure_default_config() -> Result<()> {
    ensure_default_config_at(default_config_path())
}

/// As [`ensure_default_config`], for an explicit path.
pub fn ensure_default_config_at(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_falls_back_to_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("nope.toml"))?;
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.search_debounce(), Duration::from_millis(500));
        assert!(config.session_file.is_none());
        Ok(())
    }

    #[test]
    fn file_values_override_defaults_and_trailing_slash_is_trimmed() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "endpoint = \"https://qkart.example.com/api/v1/\"\nsearch_debounce_ms = 250\n",
        )?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.endpoint, "https://qkart.example.com/api/v1");
        assert_eq!(config.search_debounce_ms, 250);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        Ok(())
    }

    #[test]
    fn default_config_is_written_once_and_parses() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join(CONFIG_FILE);
        ensure_default_config_at(&path)?;
        assert!(path.exists());

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);

        // A second call must not clobber user edits.
        fs::write(&path, "endpoint = \"http://edited:9000\"\n")?;
        ensure_default_config_at(&path)?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.endpoint, "http://edited:9000");
        Ok(())
    }
}
