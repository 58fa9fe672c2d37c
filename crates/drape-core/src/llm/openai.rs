//! OpenAI-compatible provider using the Chat Completions API.
//!
//! Sends a system + user message pair and optionally requests
//! `response_format: {"type": "json_object"}`.

use super::provider::{LlmProvider, LlmRequest, LlmResponse};
use crate::error::AnalyzeError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};

/// OpenAI-compatible provider using Chat Completions API.
pub struct OpenAiProvider {
    name: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, model: &str, timeout: Duration) -> Self {
        Self::with_endpoint(
            api_key,
            model,
            "https://api.openai.com/v1/chat/completions",
            timeout,
        )
    }

    /// Create with a custom endpoint (used by the Groq provider).
    pub fn with_endpoint(api_key: &str, model: &str, endpoint: &str, timeout: Duration) -> Self {
        Self {
            name: "OpenAI".to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            timeout,
        }
    }

    /// Override the name reported in logs and errors.
    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, AnalyzeError> {
        let start = Instant::now();

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            response_format: request.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
            temperature: request.temperature,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| AnalyzeError::transport(&self.name, e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AnalyzeError::status(&self.name, status.as_u16(), text));
        }

        // The body is decoded loosely: a 2xx answer without usable content is
        // reported as `text: None`, not as a failed call.
        let chat_resp: Value = match resp.json().await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("{} returned a non-JSON completion body: {e}", self.name);
                Value::Null
            }
        };

        let text = chat_resp
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(|t| t.trim().to_string());

        Ok(LlmResponse {
            text,
            model: chat_resp
                .get("model")
                .and_then(Value::as_str)
                .map(str::to_string),
            tokens_used: chat_resp
                .pointer("/usage/total_tokens")
                .and_then(Value::as_u64)
                .map(|t| t as u32),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}
