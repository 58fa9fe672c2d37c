//! Error types for the Drape analysis relay.
//!
//! Errors are split by concern: configuration, the upload-analysis flow and
//! face-attribute analysis. Each carries enough context to log the specific
//! upstream cause while the HTTP layer reports a single opaque message.

use thiserror::Error;

/// Top-level error type for Drape operations.
#[derive(Error, Debug)]
pub enum DrapeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Upload-analysis errors
    #[error("Analysis error: {0}")]
    Analyze(#[from] AnalyzeError),

    /// Face-attribute analysis errors
    #[error("Face analysis error: {0}")]
    Face(#[from] FaceError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Classification of everything that can go wrong while analyzing an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No file in the request. User-correctable.
    MissingInput,
    /// Required credentials are absent. Operator-correctable.
    MisconfiguredService,
    /// A remote call succeeded but its response lacked an expected field.
    UpstreamProtocolViolation,
    /// Network error or non-success status from a provider.
    UpstreamCallFailure,
    /// The language model's output could not be parsed. Never fatal.
    RecommendationParseFailure,
}

/// Errors that abort an upload analysis.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// The request carried no image file
    #[error("No image uploaded")]
    MissingInput,

    /// Provider credentials are not configured
    #[error("Missing {provider} credentials")]
    MisconfiguredService { provider: String },

    /// The provider answered, but without a field the flow depends on
    #[error("{message}")]
    UpstreamProtocolViolation { provider: String, message: String },

    /// Transport failure or non-2xx status from a provider
    #[error("{message}")]
    UpstreamCallFailure {
        provider: String,
        message: String,
        status_code: Option<u16>,
        /// Raw upstream error payload, kept for diagnostics
        body: Option<String>,
    },
}

impl AnalyzeError {
    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingInput => ErrorKind::MissingInput,
            Self::MisconfiguredService { .. } => ErrorKind::MisconfiguredService,
            Self::UpstreamProtocolViolation { .. } => ErrorKind::UpstreamProtocolViolation,
            Self::UpstreamCallFailure { .. } => ErrorKind::UpstreamCallFailure,
        }
    }

    /// Name of the provider involved, if any.
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::MissingInput => None,
            Self::MisconfiguredService { provider }
            | Self::UpstreamProtocolViolation { provider, .. }
            | Self::UpstreamCallFailure { provider, .. } => Some(provider),
        }
    }

    pub(crate) fn misconfigured(provider: &str) -> Self {
        Self::MisconfiguredService {
            provider: provider.to_string(),
        }
    }

    pub(crate) fn protocol(provider: &str, message: impl Into<String>) -> Self {
        Self::UpstreamProtocolViolation {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// A non-2xx answer. The message never names the provider; callers only
    /// learn that the analysis failed.
    pub(crate) fn status(provider: &str, status_code: u16, body: String) -> Self {
        Self::UpstreamCallFailure {
            provider: provider.to_string(),
            message: format!("Request failed with status code {status_code}"),
            status_code: Some(status_code),
            body: (!body.is_empty()).then_some(body),
        }
    }

    pub(crate) fn transport(provider: &str, err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "Request timed out".to_string()
        } else {
            format!("Request failed: {}", err.without_url())
        };
        Self::UpstreamCallFailure {
            provider: provider.to_string(),
            message,
            status_code: None,
            body: None,
        }
    }
}

/// The language model's content could not be turned into recommendations.
///
/// Swallowed by the analyzer: the request still succeeds with an empty list.
#[derive(Error, Debug)]
#[error("Could not parse recommendations: {message}")]
pub struct RecommendationParseFailure {
    pub message: String,
}

impl RecommendationParseFailure {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::RecommendationParseFailure
    }
}

/// Classified failure categories for face-attribute analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceErrorKind {
    /// Face credentials absent from configuration
    MissingCredentials,
    /// Credentials rejected or lacking permission
    BadCredentials,
    /// File type outside the accepted set
    UnsupportedFormat,
    /// File larger than the accepted size
    ImageTooLarge,
    /// The provider found no face in the image
    NoFaceDetected,
    /// A face was found but is unusable
    InvalidFace,
    /// Provider rejected the request for another reason
    InvalidRequest,
    /// Too many requests
    RateLimited,
    /// Provider-side 5xx
    ServiceUnavailable,
    /// Request did not complete in time
    NetworkTimeout,
    /// Connection could not be established
    NetworkError,
    /// Anything the classification table does not cover
    Unknown,
}

impl FaceErrorKind {
    /// Human-readable guidance shown to the user.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::MissingCredentials => {
                "Face API credentials are missing. Set FACE_KEY and FACE_SECRET."
            }
            Self::BadCredentials => {
                "API authorization failed. Verify the face API credentials and their permissions."
            }
            Self::UnsupportedFormat => "Unsupported image format. Use JPG, PNG or BMP files only.",
            Self::ImageTooLarge => "Image file too large. Use an image smaller than 2MB.",
            Self::NoFaceDetected => "No face detected. Upload a clear image with a visible face.",
            Self::InvalidFace => {
                "Invalid face detected. Make sure the image contains a clear, front-facing face."
            }
            Self::InvalidRequest => "Invalid request. Check the image and try again.",
            Self::RateLimited => "API rate limit exceeded. Wait a moment and try again.",
            Self::ServiceUnavailable => "Face service temporarily unavailable. Try again later.",
            Self::NetworkTimeout => {
                "Request timeout. The image may be too large or the connection is slow."
            }
            Self::NetworkError => "Network error. Check the internet connection and try again.",
            Self::Unknown => "Face analysis failed.",
        }
    }
}

/// A classified face-analysis failure.
#[derive(Error, Debug)]
#[error("{}{}", .kind.user_message(), detail_suffix(.detail))]
pub struct FaceError {
    pub kind: FaceErrorKind,
    /// Provider error message or transport detail, if any
    pub detail: Option<String>,
    pub status_code: Option<u16>,
}

impl FaceError {
    pub fn new(kind: FaceErrorKind) -> Self {
        Self {
            kind,
            detail: None,
            status_code: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

/// Convenience type alias for Drape results.
pub type Result<T> = std::result::Result<T, DrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(AnalyzeError::MissingInput.kind(), ErrorKind::MissingInput);
        assert_eq!(
            AnalyzeError::misconfigured("imagga").kind(),
            ErrorKind::MisconfiguredService
        );
        assert_eq!(
            AnalyzeError::protocol("imagga", "Upload ID not received").kind(),
            ErrorKind::UpstreamProtocolViolation
        );
        assert_eq!(
            AnalyzeError::status("groq", 503, String::new()).kind(),
            ErrorKind::UpstreamCallFailure
        );
    }

    #[test]
    fn test_status_message_hides_provider() {
        let err = AnalyzeError::status("imagga", 401, r#"{"status":{"type":"error"}}"#.into());
        assert_eq!(err.to_string(), "Request failed with status code 401");
        assert_eq!(err.provider(), Some("imagga"));
        match err {
            AnalyzeError::UpstreamCallFailure { body, .. } => assert!(body.is_some()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_empty_upstream_body_dropped() {
        match AnalyzeError::status("imagga", 500, String::new()) {
            AnalyzeError::UpstreamCallFailure { body, .. } => assert!(body.is_none()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_misconfigured_message() {
        let err = AnalyzeError::misconfigured("Imagga");
        assert_eq!(err.to_string(), "Missing Imagga credentials");
    }

    #[test]
    fn test_face_error_display_includes_detail() {
        let err = FaceError::new(FaceErrorKind::RateLimited).with_detail("CONCURRENCY_LIMIT_EXCEEDED");
        let text = err.to_string();
        assert!(text.contains("rate limit"));
        assert!(text.contains("CONCURRENCY_LIMIT_EXCEEDED"));
    }
}
