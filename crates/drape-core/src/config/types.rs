//! Sub-configuration structs with defaults for the hosted providers.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::resolve_env_var;

/// HTTP relay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Multipart field that carries the image
    pub upload_field: String,

    /// Directory for staged uploads. Empty means the system temp dir.
    pub upload_dir: PathBuf,

    /// Maximum request body size in megabytes
    pub max_upload_mb: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            upload_field: "image".to_string(),
            upload_dir: PathBuf::new(),
            max_upload_mb: 10,
        }
    }
}

/// A resolved key/secret pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub key: String,
    pub secret: String,
}

/// Image tagging and color extraction provider (Imagga).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// API base URL
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// API secret (supports ${ENV_VAR} syntax)
    pub api_secret: String,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.imagga.com/v2".to_string(),
            api_key: "${IMAGGA_KEY}".to_string(),
            api_secret: "${IMAGGA_SECRET}".to_string(),
            timeout_ms: 60_000,
        }
    }
}

impl VisionConfig {
    /// Resolve the key/secret pair. `None` if either half is missing.
    pub fn credentials(&self) -> Option<Credentials> {
        Some(Credentials {
            key: resolve_env_var(&self.api_key)?,
            secret: resolve_env_var(&self.api_secret)?,
        })
    }
}

/// Chat-completion provider (Groq, OpenAI-compatible).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider: "groq" or "openai" (any OpenAI-compatible endpoint)
    pub provider: String,

    /// API base URL (the `/chat/completions` path is appended)
    pub endpoint: String,

    /// Bearer token (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,

    /// Ask the provider for a JSON object response
    pub json_mode: bool,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            endpoint: "https://api.groq.com/openai/v1".to_string(),
            api_key: "${GROQ_KEY}".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            json_mode: true,
            timeout_ms: 60_000,
        }
    }
}

impl LlmConfig {
    /// Resolve the bearer token.
    pub fn token(&self) -> Option<String> {
        resolve_env_var(&self.api_key)
    }
}

/// Face-attribute detection provider (Face++).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceConfig {
    /// API base URL
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// API secret (supports ${ENV_VAR} syntax)
    pub api_secret: String,

    /// Comma-separated attribute list requested from the detector
    pub return_attributes: String,

    /// Detection timeout in milliseconds
    pub timeout_ms: u64,

    /// Connection-check timeout in milliseconds
    pub check_timeout_ms: u64,

    /// Maximum image size in megabytes
    pub max_file_size_mb: u64,

    /// Accepted image formats
    pub allowed_formats: Vec<String>,
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-us.faceplusplus.com".to_string(),
            api_key: "${FACE_KEY}".to_string(),
            api_secret: "${FACE_SECRET}".to_string(),
            return_attributes: "gender,age,ethnicity,skinstatus,headpose,beauty,facequality,\
                                emotion,hair,eyestatus"
                .to_string(),
            timeout_ms: 45_000,
            check_timeout_ms: 10_000,
            max_file_size_mb: 2,
            allowed_formats: vec![
                "jpeg".to_string(),
                "jpg".to_string(),
                "png".to_string(),
                "bmp".to_string(),
            ],
        }
    }
}

impl FaceConfig {
    /// Resolve the key/secret pair. `None` if either half is missing.
    pub fn credentials(&self) -> Option<Credentials> {
        Some(Credentials {
            key: resolve_env_var(&self.api_key)?,
            secret: resolve_env_var(&self.api_secret)?,
        })
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
