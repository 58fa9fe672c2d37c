//! LLM provider trait and request/response types.
//!
//! Defines the interface that all chat-completion providers implement, plus
//! the factory that creates the right provider from config.

use crate::config::LlmConfig;
use crate::error::AnalyzeError;
use async_trait::async_trait;
use std::time::Duration;

/// A single chat-completion request: one system and one user message.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Fixed instruction for the assistant
    pub system: String,
    /// User message content
    pub user: String,
    /// Request a JSON object response, if the provider supports it
    pub json_mode: bool,
    /// Sampling temperature; provider default when unset
    pub temperature: Option<f32>,
}

/// The response from a chat-completion call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Content of the first choice. `None` if the provider sent no usable content.
    pub text: Option<String>,
    /// Model identifier reported by the provider
    pub model: Option<String>,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all LLM providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Arc<dyn LlmProvider>` for dynamic dispatch).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging (e.g., "Groq").
    fn name(&self) -> &str;

    /// Run one chat completion. Transport failures and non-2xx statuses are
    /// errors; a 2xx answer with unusable content is not.
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, AnalyzeError>;

    /// Per-request timeout for this provider.
    fn timeout(&self) -> Duration;
}

/// Factory that creates the appropriate provider from config.
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create an LLM provider from the `[llm]` config section.
    ///
    /// Fails with `MisconfiguredService` when the bearer token is missing.
    pub fn create(config: &LlmConfig) -> Result<Box<dyn LlmProvider>, AnalyzeError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        match config.provider.as_str() {
            "groq" => {
                let token = config
                    .token()
                    .ok_or_else(|| AnalyzeError::misconfigured("Groq"))?;
                Ok(Box::new(super::groq::GroqProvider::new(
                    &config.endpoint,
                    &token,
                    &config.model,
                    timeout,
                )))
            }
            "openai" => {
                let token = config
                    .token()
                    .ok_or_else(|| AnalyzeError::misconfigured("OpenAI"))?;
                let url = format!("{}/chat/completions", config.endpoint.trim_end_matches('/'));
                Ok(Box::new(super::openai::OpenAiProvider::with_endpoint(
                    &token,
                    &config.model,
                    &url,
                    timeout,
                )))
            }
            other => Err(AnalyzeError::misconfigured(&format!(
                "LLM (unknown provider '{other}')"
            ))),
        }
    }
}
