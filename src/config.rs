//! Configuration management for InsightGen.
//!
//! Handles loading configuration from TOML files and environment variables.
//! The resulting `Config` is built once and passed to constructors; nothing
//! reads configuration from global state afterwards.

use crate::error::{InsightError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Main configuration structure for InsightGen.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM provider configuration.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Store location and pool settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Query validation settings.
    #[serde(default)]
    pub safety: SafetyConfig,
}

/// LLM provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider: "gemini", "openai" or "mock".
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// API key. Prefer the provider's environment variable over storing it here.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Upper bound on pooled connections shared by concurrent requests.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("sales.db")
}

fn default_max_connections() -> u32 {
    4
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl StoreConfig {
    /// Creates a store config for the given database file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_connections: default_max_connections(),
        }
    }

    /// Parses a store location given as a plain path or a `sqlite:` URL.
    ///
    /// Accepted forms: `sales.db`, `/data/sales.db`, `sqlite:sales.db`,
    /// `sqlite:///data/sales.db`.
    pub fn from_location(location: &str) -> Result<Self> {
        if !location.contains(':') || Path::new(location).is_absolute() {
            return Ok(Self::new(location));
        }

        let url = Url::parse(location)
            .map_err(|e| InsightError::config(format!("Invalid store location: {e}")))?;

        if url.scheme() != "sqlite" {
            return Err(InsightError::config(format!(
                "Invalid scheme '{}'. Expected 'sqlite'",
                url.scheme()
            )));
        }

        // `sqlite:sales.db` is a relative path; `sqlite:///abs` carries an empty host.
        let path = if url.cannot_be_a_base() {
            url.path().to_string()
        } else {
            match url.host_str() {
                Some(host) if !host.is_empty() => format!("{host}{}", url.path()),
                _ => url.path().to_string(),
            }
        };

        if path.is_empty() {
            return Err(InsightError::config("Store location has no path"));
        }

        Ok(Self::new(path))
    }
}

/// Query validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// Parse generated SQL and reject anything but a single read-only query,
    /// on top of the `select` prefix check.
    #[serde(default = "default_strict")]
    pub strict: bool,
}

fn default_strict() -> bool {
    true
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            strict: default_strict(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("insightgen")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| InsightError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            InsightError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }
}
