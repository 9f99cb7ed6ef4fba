//! Configuration loading and resolution
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Command-line and environment values arrive together as [`Overrides`]
//! (clap merges the two in the binary). This module only deals with the
//! TOML layer and the final merge.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default BaaS API base URL
pub const DEFAULT_BAAS_BASE_URL: &str = "https://blockapi.co.za/api/v1";

/// Default listening port
pub const DEFAULT_PORT: u16 = 5000;

/// Default bind host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default log level when neither RUST_LOG nor the config file set one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Session secret used when none is configured. Development only.
pub const DEV_SESSION_SECRET: &str = "fallback-secret-for-dev-only";

/// Contents of the optional TOML config file
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub baas_base_url: Option<String>,
    pub baas_api_key: Option<String>,
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub session_secret: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load a config file.
    ///
    /// A missing or unreadable file is not fatal: it is reported as
    /// [`ConfigFile::Unreadable`] so the caller can log it and fall back to
    /// defaults. A file that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<ConfigFile> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)
                .map(ConfigFile::Parsed)
                .map_err(|e| match e {
                    Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
                }),
            Err(e) => Ok(ConfigFile::Unreadable(e.to_string())),
        }
    }
}

/// Outcome of reading the config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigFile {
    Parsed(TomlConfig),
    /// File could not be read; carries the I/O error text
    Unreadable(String),
}

impl ConfigFile {
    /// Parsed contents, or empty defaults when the file was unreadable
    pub fn into_config(self) -> TomlConfig {
        match self {
            ConfigFile::Parsed(config) => config,
            ConfigFile::Unreadable(_) => TomlConfig::default(),
        }
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub baas_base_url: Option<String>,
    pub baas_api_key: Option<String>,
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub session_secret: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Fully resolved server settings
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub baas_base_url: String,
    pub baas_api_key: Option<String>,
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub session_secret: String,
    /// True when `session_secret` is the development fallback
    pub session_secret_is_default: bool,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

// Secrets stay out of logs
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("baas_base_url", &self.baas_base_url)
            .field("baas_api_key", &self.baas_api_key.as_ref().map(|_| "<redacted>"))
            .field("webhook_url", &self.webhook_url)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .field("session_secret", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Settings {
    /// Merge overrides over the TOML layer over compiled defaults
    pub fn resolve(overrides: Overrides, file: TomlConfig) -> Self {
        let session_secret = non_empty(overrides.session_secret).or(non_empty(file.session_secret));
        let session_secret_is_default = session_secret.is_none();

        let baas_base_url = non_empty(overrides.baas_base_url)
            .or(non_empty(file.baas_base_url))
            .unwrap_or_else(|| DEFAULT_BAAS_BASE_URL.to_string());

        Self {
            baas_base_url: baas_base_url.trim_end_matches('/').to_string(),
            baas_api_key: non_empty(overrides.baas_api_key).or(non_empty(file.baas_api_key)),
            webhook_url: non_empty(overrides.webhook_url).or(non_empty(file.webhook_url)),
            webhook_secret: non_empty(overrides.webhook_secret).or(non_empty(file.webhook_secret)),
            session_secret: session_secret.unwrap_or_else(|| DEV_SESSION_SECRET.to_string()),
            session_secret_is_default,
            host: non_empty(overrides.host)
                .or(non_empty(file.host))
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: overrides.port.or(file.port).unwrap_or(DEFAULT_PORT),
            log_level: non_empty(file.log_level).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }

    /// `host:port` string for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(Overrides::default(), TomlConfig::default())
    }
}

/// Treat empty and whitespace-only strings as unset
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
