//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.server.upload_field.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server.upload_field must not be empty".into(),
            ));
        }
        if self.server.max_upload_mb == 0 {
            return Err(ConfigError::ValidationError(
                "server.max_upload_mb must be > 0".into(),
            ));
        }
        for (name, endpoint) in [
            ("vision.endpoint", &self.vision.endpoint),
            ("llm.endpoint", &self.llm.endpoint),
            ("face.endpoint", &self.face.endpoint),
        ] {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be an http(s) URL"
                )));
            }
        }
        if self.vision.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "vision.timeout_ms must be > 0".into(),
            ));
        }
        if self.llm.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "llm.timeout_ms must be > 0".into(),
            ));
        }
        if !matches!(self.llm.provider.as_str(), "groq" | "openai") {
            return Err(ConfigError::ValidationError(format!(
                "llm.provider must be \"groq\" or \"openai\", got \"{}\"",
                self.llm.provider
            )));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.model must not be empty".into(),
            ));
        }
        if self.face.timeout_ms == 0 || self.face.check_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "face.timeout_ms and face.check_timeout_ms must be > 0".into(),
            ));
        }
        if self.face.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "face.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.face.allowed_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "face.allowed_formats must not be empty".into(),
            ));
        }
        Ok(())
    }
}
