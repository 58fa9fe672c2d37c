//! Imagga vision provider (`/uploads`, `/tags`, `/colors`).

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::{Map, Value};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncReadExt;

use super::VisionProvider;
use crate::config::Credentials;
use crate::error::AnalyzeError;
use crate::types::{ColorProfile, TagSet, UploadHandle};
use crate::upload::StagedUpload;

const NAME: &str = "Imagga";

/// Imagga v2 REST client, authenticated with HTTP Basic auth.
pub struct ImaggaProvider {
    credentials: Credentials,
    endpoint: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl ImaggaProvider {
    pub fn new(endpoint: &str, credentials: Credentials, timeout: Duration) -> Self {
        Self {
            credentials,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            timeout,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    /// Send a request and decode a 2xx JSON body.
    ///
    /// Non-2xx answers keep the upstream body for diagnostics. A 2xx answer
    /// that isn't JSON is a protocol violation.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, AnalyzeError> {
        let resp = request
            .basic_auth(&self.credentials.key, Some(&self.credentials.secret))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AnalyzeError::transport(NAME, e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AnalyzeError::status(NAME, status.as_u16(), text));
        }

        resp.json::<Value>()
            .await
            .map_err(|e| AnalyzeError::protocol(NAME, format!("Malformed response body: {e}")))
    }

    async fn query(&self, path: &str, handle: &UploadHandle) -> Result<Value, AnalyzeError> {
        let request = self
            .client
            .get(self.url(path))
            .query(&[("image_upload_id", handle.as_str())]);
        self.send(request).await
    }
}

#[async_trait]
impl VisionProvider for ImaggaProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn upload(&self, image: &StagedUpload) -> Result<UploadHandle, AnalyzeError> {
        let staged_read_failure = |e: std::io::Error| AnalyzeError::UpstreamCallFailure {
            provider: NAME.to_string(),
            message: format!("Could not read staged upload: {e}"),
            status_code: None,
            body: None,
        };
        let file = tokio::fs::File::open(image.path())
            .await
            .map_err(staged_read_failure)?;
        let len = file.metadata().await.map_err(staged_read_failure)?.len();

        let head = sniff_head(image.path()).await;

        let part = Part::stream_with_length(reqwest::Body::from(file), len)
            .file_name(image.file_name().to_string())
            .mime_str(&image.mime_type(&head))
            .map_err(|e| AnalyzeError::transport(NAME, e))?;
        let form = Form::new().part("image", part);

        let body = self
            .send(self.client.post(self.url("uploads")).multipart(form))
            .await?;

        body.pointer("/result/upload_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(|id| UploadHandle(id.to_string()))
            .ok_or_else(|| AnalyzeError::protocol(NAME, "Upload ID not received"))
    }

    async fn tags(&self, handle: &UploadHandle) -> Result<TagSet, AnalyzeError> {
        let body = self.query("tags", handle).await?;
        let tags = body
            .pointer("/result/tags")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(TagSet::new(tags))
    }

    async fn colors(&self, handle: &UploadHandle) -> Result<ColorProfile, AnalyzeError> {
        let body = self.query("colors", handle).await?;
        Ok(ColorProfile::new(color_fields(&body)))
    }
}

/// Imagga nests the profile under `result.colors`; some deployments return
/// the lists directly under `result`. Anything else is an empty profile.
fn color_fields(body: &Value) -> Map<String, Value> {
    let Some(result) = body.get("result") else {
        return Map::new();
    };
    if let Some(colors) = result.get("colors").and_then(Value::as_object) {
        return colors.clone();
    }
    match result.as_object() {
        Some(flat) if flat.contains_key("dominant_colors") || flat.contains_key("image_colors") => {
            flat.clone()
        }
        _ => Map::new(),
    }
}

/// First bytes of the staged file, for MIME sniffing.
async fn sniff_head(path: &Path) -> Vec<u8> {
    let mut head = Vec::with_capacity(12);
    if let Ok(file) = tokio::fs::File::open(path).await {
        let _ = file.take(12).read_to_end(&mut head).await;
    }
    head
}
