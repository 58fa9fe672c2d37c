//! HTTP client for the face-attribute detector.

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

use super::attributes::FaceAttributes;
use super::classify::{classify_status, classify_transport};
use crate::config::{Credentials, FaceConfig};
use crate::error::{FaceError, FaceErrorKind};
use crate::format::ImageFormat;

/// Client for `/facepp/v3/detect` and `/facepp/v3/get_app`.
pub struct FaceClient {
    client: reqwest::Client,
    endpoint: String,
    credentials: Option<Credentials>,
    return_attributes: String,
    timeout: Duration,
    check_timeout: Duration,
    max_bytes: u64,
    allowed_formats: Vec<String>,
}

impl FaceClient {
    pub fn new(config: &FaceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            credentials: config.credentials(),
            return_attributes: config.return_attributes.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
            check_timeout: Duration::from_millis(config.check_timeout_ms),
            max_bytes: config.max_file_size_mb.saturating_mul(1024 * 1024),
            allowed_formats: config.allowed_formats.clone(),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    fn credentials(&self) -> Result<&Credentials, FaceError> {
        self.credentials
            .as_ref()
            .ok_or_else(|| FaceError::new(FaceErrorKind::MissingCredentials))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/facepp/v3/{}", self.endpoint, path)
    }

    /// Check an image against the accepted formats and size.
    ///
    /// A declared MIME type is authoritative. Without one the format is
    /// sniffed from the bytes, then guessed from the file extension.
    pub fn validate(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<ImageFormat, FaceError> {
        let format = match content_type {
            Some(mime) => ImageFormat::from_mime(mime),
            None => ImageFormat::sniff(bytes).or_else(|| {
                Path::new(file_name)
                    .extension()
                    .and_then(|e| e.to_str())
                    .and_then(ImageFormat::from_name)
            }),
        };

        let format = match format {
            Some(f) if self.allowed_formats.iter().any(|name| f.matches_name(name)) => f,
            _ => {
                return Err(FaceError::new(FaceErrorKind::UnsupportedFormat)
                    .with_detail(content_type.unwrap_or(file_name)))
            }
        };

        if bytes.len() as u64 > self.max_bytes {
            return Err(FaceError::new(FaceErrorKind::ImageTooLarge)
                .with_detail(format!("{} bytes", bytes.len())));
        }

        Ok(format)
    }

    /// Detect faces in an image and return the first face's attributes.
    ///
    /// Credentials and the image are checked locally before any request.
    pub async fn detect(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<FaceAttributes, FaceError> {
        let credentials = self.credentials()?;
        let format = self.validate(file_name, content_type, &bytes)?;

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(format.mime_type())
            .map_err(|e| FaceError::new(FaceErrorKind::InvalidRequest).with_detail(e.to_string()))?;
        let form = Form::new().part("image_file", part);

        tracing::debug!("Detecting faces in {}", file_name);
        let resp = self
            .client
            .post(self.url("detect"))
            .query(&[
                ("api_key", credentials.key.as_str()),
                ("api_secret", credentials.secret.as_str()),
                ("return_attributes", self.return_attributes.as_str()),
            ])
            .multipart(form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify_transport)?;

        let body = read_body(resp).await?;

        let first = body
            .get("faces")
            .and_then(Value::as_array)
            .and_then(|faces| faces.first())
            .ok_or_else(|| FaceError::new(FaceErrorKind::NoFaceDetected))?;

        match first.get("attributes") {
            Some(attributes) => serde_json::from_value(attributes.clone()).map_err(|e| {
                FaceError::new(FaceErrorKind::Unknown)
                    .with_detail(format!("unexpected attributes: {e}"))
            }),
            None => Ok(FaceAttributes::default()),
        }
    }

    /// Read an image from disk and run [`FaceClient::detect`].
    pub async fn detect_file(&self, path: &Path) -> Result<FaceAttributes, FaceError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            FaceError::new(FaceErrorKind::InvalidRequest)
                .with_detail(format!("{}: {e}", path.display()))
        })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image");
        self.detect(file_name, None, bytes).await
    }

    /// Verify that the credentials are accepted. Returns the app info.
    pub async fn check_connection(&self) -> Result<Value, FaceError> {
        let credentials = self.credentials()?;

        let resp = self
            .client
            .get(self.url("get_app"))
            .query(&[
                ("api_key", credentials.key.as_str()),
                ("api_secret", credentials.secret.as_str()),
            ])
            .timeout(self.check_timeout)
            .send()
            .await
            .map_err(classify_transport)?;

        read_body(resp).await
    }
}

/// Decode a detector answer, classifying non-2xx statuses.
async fn read_body(resp: reqwest::Response) -> Result<Value, FaceError> {
    let status = resp.status();
    let text = resp.text().await.map_err(classify_transport)?;

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&text).ok().and_then(|v| {
            ["error_message", "error_msg", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(Value::as_str).map(str::to_string))
        });
        tracing::error!("Face detector returned {}: {}", status.as_u16(), text);
        return Err(classify_status(status.as_u16(), message.as_deref()));
    }

    serde_json::from_str(&text).map_err(|e| {
        FaceError::new(FaceErrorKind::Unknown).with_detail(format!("malformed response: {e}"))
    })
}
