//! LLM Provider Strategy Pattern
//!
//! Common interface for language-model backends. Only the model-backed
//! decision engine talks to a provider; the rule-based engine needs none.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::{GenerationOptions, LlmProvider};
//!
//! let provider = OllamaProvider::new("http://localhost", 11434);
//! let completion = provider.complete(&messages, &GenerationOptions::default()).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "llama3.2")
    pub model: String,

    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Top-p nucleus sampling
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

const fn default_temperature() -> f32 {
    0.2
}
const fn default_max_tokens() -> u32 {
    1024
}
const fn default_top_p() -> f32 {
    0.9
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "llama3.2".into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
        }
    }
}

/// Response from an LLM completion
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text
    pub content: String,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,

    /// Finish reason
    pub finish_reason: Option<FinishReason>,
}

/// Token usage statistics
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reason for completion finishing
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    Error,
}

/// Provider metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "Ollama")
    pub name: String,

    /// Available models
    pub models: Vec<ModelInfo>,
}

/// Information about a model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
}

/// Strategy trait for LLM providers
///
/// Implement this trait to add support for new LLM backends.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get provider information and capabilities
    async fn info(&self) -> Result<ProviderInfo>;

    /// Check if the provider is available and configured correctly
    async fn health_check(&self) -> Result<bool>;

    /// Generate a completion from messages
    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion>;

    /// List available models
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;
}
