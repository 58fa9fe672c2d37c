//! Groq LLM provider (OpenAI-compatible API).
//!
//! Groq uses the same Chat Completions format as OpenAI,
//! so this delegates to `OpenAiProvider` with a custom endpoint.

use super::openai::OpenAiProvider;
use super::provider::{LlmProvider, LlmRequest, LlmResponse};
use crate::error::AnalyzeError;
use async_trait::async_trait;
use std::time::Duration;

/// Groq provider wrapping an OpenAI-compatible endpoint.
pub struct GroqProvider {
    inner: OpenAiProvider,
}

impl GroqProvider {
    pub fn new(endpoint: &str, api_key: &str, model: &str, timeout: Duration) -> Self {
        let url = format!("{}/chat/completions", endpoint.trim_end_matches('/'));
        Self {
            inner: OpenAiProvider::with_endpoint(api_key, model, &url, timeout).named("Groq"),
        }
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, AnalyzeError> {
        self.inner.complete(request).await
    }

    fn timeout(&self) -> Duration {
        self.inner.timeout()
    }
}
