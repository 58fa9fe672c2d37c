//! Mapping from provider failures to [`FaceErrorKind`].
//!
//! Classification is a single ordered table keyed by HTTP status and the
//! error code the provider puts in front of its `error_message`
//! (`CODE: detail`). The first matching row wins.

use crate::error::{FaceError, FaceErrorKind};

#[derive(Debug, Clone, Copy)]
enum StatusMatch {
    Exact(u16),
    ServerError,
    Any,
}

impl StatusMatch {
    fn matches(self, status: u16) -> bool {
        match self {
            Self::Exact(s) => s == status,
            Self::ServerError => status >= 500,
            Self::Any => true,
        }
    }
}

struct Rule {
    status: StatusMatch,
    /// Substring of the error code; `None` matches any code.
    code: Option<&'static str>,
    kind: FaceErrorKind,
}

const fn rule(status: StatusMatch, code: Option<&'static str>, kind: FaceErrorKind) -> Rule {
    Rule { status, code, kind }
}

use FaceErrorKind::*;
use StatusMatch::*;

const RULES: &[Rule] = &[
    rule(Exact(401), None, BadCredentials),
    rule(Exact(403), Some("AUTHORIZATION_ERROR"), BadCredentials),
    rule(Exact(403), Some("AUTHENTICATION_ERROR"), BadCredentials),
    rule(Exact(403), Some("CONCURRENCY_LIMIT_EXCEEDED"), RateLimited),
    rule(Any, Some("IMAGE_ERROR_UNSUPPORTED_FORMAT"), UnsupportedFormat),
    rule(Any, Some("NO_FACE"), NoFaceDetected),
    rule(Any, Some("NO_PERSON"), NoFaceDetected),
    rule(Any, Some("IMAGE_FILE_TOO_LARGE"), ImageTooLarge),
    rule(Any, Some("IMAGE_ERROR_INVALID_FACE"), InvalidFace),
    rule(Any, Some("INVALID_FACE"), InvalidFace),
    rule(Exact(403), None, BadCredentials),
    rule(Exact(413), None, ImageTooLarge),
    rule(Exact(400), None, InvalidRequest),
    rule(Exact(429), None, RateLimited),
    rule(ServerError, None, ServiceUnavailable),
];

/// Extract the leading error code from an `error_message` like
/// `"AUTHORIZATION_ERROR: Denied by Client"`.
pub(crate) fn error_code(message: &str) -> &str {
    message.split(':').next().unwrap_or_default().trim()
}

/// Classify a non-2xx provider answer.
pub(crate) fn classify_status(status: u16, error_message: Option<&str>) -> FaceError {
    let code = error_message.map(error_code).unwrap_or_default();

    let kind = RULES
        .iter()
        .find(|r| {
            r.status.matches(status)
                && r.code
                    .map_or(true, |c| !code.is_empty() && code.contains(c))
        })
        .map(|r| r.kind)
        .unwrap_or(Unknown);

    let error = FaceError::new(kind).with_status(status);
    match error_message.filter(|m| !m.is_empty()) {
        Some(message) => error.with_detail(message),
        None => error,
    }
}

/// Classify a request that never produced a response.
pub(crate) fn classify_transport(err: reqwest::Error) -> FaceError {
    let kind = if err.is_timeout() {
        NetworkTimeout
    } else if err.is_connect() || err.is_request() {
        NetworkError
    } else {
        Unknown
    };
    FaceError::new(kind).with_detail(err.without_url().to_string())
}
