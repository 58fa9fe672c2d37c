//! LLM integration for fashion recommendations.
//!
//! Provides a provider abstraction over OpenAI-compatible chat-completion
//! backends (Groq by default) and the stylist prompt/parse pair used by the
//! analyzer.

pub(crate) mod groq;
pub(crate) mod openai;
pub(crate) mod provider;
pub(crate) mod stylist;

pub use groq::GroqProvider;
pub use openai::OpenAiProvider;
pub use provider::{LlmProvider, LlmProviderFactory, LlmRequest, LlmResponse};
pub use stylist::{parse_recommendations, STYLIST_PROMPT};
