//! Configuration management for Drape.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Provider credentials default to `${ENV_VAR}` references so a
//! bare install only needs the usual environment variables.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Drape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP relay settings
    pub server: ServerConfig,

    /// Vision (tagging/color) provider settings
    pub vision: VisionConfig,

    /// Language-model provider settings
    pub llm: LlmConfig,

    /// Face-attribute provider settings
    pub face: FaceConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.drape.drape/config.toml
    /// - Linux: ~/.config/drape/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\drape\config\config.toml
    ///
    /// Falls back to ~/.drape/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "drape", "drape")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".drape").join("config.toml")
            })
    }

    /// Get the resolved upload staging directory (with ~ expansion).
    ///
    /// An empty setting means the system temp directory.
    pub fn upload_dir(&self) -> PathBuf {
        if self.server.upload_dir.as_os_str().is_empty() {
            return std::env::temp_dir();
        }
        let path_str = self.server.upload_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
///
/// Plain values pass through; empty values and unset variables yield `None`.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
