//! Configuration loading
//!
//! Resolution order, later sources override earlier ones:
//! 1. Compiled defaults
//! 2. TOML config file (explicit path, then `WORSHIP_CONFIG`, then the
//!    per-user config directory)
//! 3. Environment variables and command-line flags (applied by the binary)
//!
//! A missing config file is not an error; a malformed one is.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "WORSHIP_CONFIG";

/// Service configuration after all sources are merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    /// Token signing secret; generated at startup when absent
    pub token_secret: Option<String>,
    pub token_ttl_hours: u64,
    /// Requests allowed per client per window; 0 disables rate limiting
    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            token_secret: None,
            token_ttl_hours: 24,
            rate_limit_max: 100,
            rate_limit_window_secs: 15 * 60,
            log_level: "info".to_string(),
        }
    }
}

/// On-disk shape: every key optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub token_secret: Option<String>,
    pub token_ttl_hours: Option<u64>,
    pub rate_limit_max: Option<u32>,
    pub rate_limit_window_secs: Option<u64>,
    pub log_level: Option<String>,
}

impl ServiceConfig {
    /// Overlay values present in a TOML config
    pub fn merge_toml(&mut self, toml: TomlConfig) {
        if let Some(host) = toml.host {
            self.host = host;
        }
        if let Some(port) = toml.port {
            self.port = port;
        }
        if let Some(secret) = toml.token_secret {
            self.token_secret = Some(secret);
        }
        if let Some(ttl) = toml.token_ttl_hours {
            self.token_ttl_hours = ttl;
        }
        if let Some(max) = toml.rate_limit_max {
            self.rate_limit_max = max;
        }
        if let Some(window) = toml.rate_limit_window_secs {
            self.rate_limit_window_secs = window;
        }
        if let Some(level) = toml.log_level {
            self.log_level = level;
        }
    }

    /// Defaults overlaid with the config file, if one is found
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        match resolve_config_path(explicit_path) {
            Some(path) if path.exists() => {
                info!("Loading config from {}", path.display());
                config.merge_toml(load_toml_file(&path)?);
            }
            Some(path) if explicit_path.is_some() => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => debug!("No config file at {}, using defaults", path.display()),
            None => debug!("No config directory available, using defaults"),
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("host must not be empty".to_string()));
        }
        if self.token_ttl_hours == 0 {
            return Err(Error::Config("token_ttl_hours must be at least 1".to_string()));
        }
        if self.rate_limit_max > 0 && self.rate_limit_window_secs == 0 {
            return Err(Error::Config(
                "rate_limit_window_secs must be non-zero when rate limiting is enabled"
                    .to_string(),
            ));
        }
        if matches!(&self.token_secret, Some(s) if s.is_empty()) {
            return Err(Error::Config("token_secret must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Parse a TOML config file
pub fn load_toml_file(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Pick the config file path following the priority order
///
/// Returns `None` only when no explicit path, no env var, and no platform
/// config directory exist.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: explicit argument
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    // Priority 2: environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: per-user config directory
    default_config_path()
}

/// `~/.config/worship/config.toml` on Linux, the platform equivalent elsewhere
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("worship").join("config.toml"))
}
