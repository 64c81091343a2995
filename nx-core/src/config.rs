//! Client configuration management.
//!
//! Handles loading, saving, and accessing client configuration including
//! server URL, credentials, timeouts, and response-handling policy.
//! Configuration is persisted as TOML on disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NxError, NxResult};

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server connection settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Handling of responses that are not JSON (e.g. downloaded files).
    #[serde(default)]
    pub download: DownloadConfig,
}

/// Server connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Automation endpoint URL (e.g. "http://localhost:8080/nuxeo/site/automation").
    #[serde(default)]
    pub url: String,

    /// Basic-auth username.
    #[serde(default)]
    pub username: String,

    /// Basic-auth password.
    #[serde(default)]
    pub password: String,

    /// Custom HTTP headers as key-value pairs.
    #[serde(default)]
    pub custom_headers: HashMap<String, String>,

    /// Request timeout in milliseconds.
    #[serde(default = "default_api_timeout")]
    pub api_timeout_ms: u64,

    /// Whether to accept self-signed SSL certificates from the server.
    #[serde(default)]
    pub accept_self_signed_certs: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, [`crate::logging::init_from_config`]
    /// stays console-only.
    #[serde(default)]
    pub directory: String,

    /// Enable JSON structured logging output for the file layer.
    #[serde(default)]
    pub json_output: bool,
}

/// Policy for response payloads that fail JSON decoding.
///
/// The automation server routes file downloads through the same JSON
/// endpoint as structured results, so a non-JSON payload is usually a
/// legitimate binary download rather than a broken response. Which of
/// the two it is cannot be told apart on the wire, so the choice is a
/// configuration knob rather than a guess.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonJsonPolicy {
    /// Persist the payload to a per-call file under the download
    /// directory and return it as the bytes variant.
    #[default]
    Persist,
    /// Return the bytes variant without touching the filesystem.
    ReturnBytes,
    /// Treat any non-JSON payload as a decode failure.
    Error,
}

/// Download / side-channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory where non-JSON response payloads are persisted.
    /// If empty, the system temp directory is used.
    #[serde(default)]
    pub directory: String,

    /// What to do with a response payload that is not JSON.
    #[serde(default)]
    pub non_json_policy: NonJsonPolicy,
}

fn default_api_timeout() -> u64 {
    crate::constants::DEFAULT_API_TIMEOUT_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            password: String::new(),
            custom_headers: HashMap::new(),
            api_timeout_ms: default_api_timeout(),
            accept_self_signed_certs: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            directory: String::new(),
            non_json_policy: NonJsonPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from the default config file path.
    pub fn load_default() -> NxResult<Self> {
        let path = Self::default_config_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> NxResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default config file path.
    pub fn save_default(&self) -> NxResult<()> {
        let path = Self::default_config_path()?;
        self.save_to_file(&path)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> NxResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| NxError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> NxResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| NxError::Config("no config directory on this platform".into()))?;
        Ok(config_dir
            .join(crate::constants::CLIENT_NAME)
            .join("config.toml"))
    }

    /// Get the effective download directory for non-JSON payloads.
    pub fn effective_download_dir(&self) -> PathBuf {
        if self.download.directory.is_empty() {
            std::env::temp_dir()
        } else {
            PathBuf::from(&self.download.directory)
        }
    }

    /// Check whether the server connection is configured.
    pub fn is_server_configured(&self) -> bool {
        !self.server.url.is_empty()
    }

    /// Sanitize and normalize a server URL.
    ///
    /// Ensures the URL has a scheme and strips trailing slashes so that
    /// operation ids can be appended as path segments.
    pub fn sanitize_server_url(url: &str) -> String {
        let trimmed = url.trim().trim_matches('"').trim();
        if trimmed.is_empty() {
            return String::new();
        }

        let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        };

        with_scheme.trim_end_matches('/').to_string()
    }
}
