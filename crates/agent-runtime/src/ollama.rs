//! Ollama LLM Provider
//!
//! Implementation of `LlmProvider` for local Ollama inference. Backs the
//! model-driven decision engine.

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{
        Completion, FinishReason, GenerationOptions, LlmProvider, ModelInfo, ProviderInfo,
        TokenUsage,
    },
};
use async_trait::async_trait;
use ollama_rs::{
    Ollama,
    generation::{
        chat::{ChatMessage, ChatMessageResponse, MessageRole, request::ChatMessageRequest},
    },
    models::ModelOptions as OllamaOptions,
};

/// Ollama provider configuration
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    /// Ollama host URL
    pub host: String,

    /// Ollama port
    pub port: u16,

    /// Model used for completions
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".into(),
            port: 11434,
            model: "llama3.2".into(),
        }
    }
}

impl OllamaConfig {
    /// Read `OLLAMA_HOST`, `OLLAMA_PORT` and `OLLAMA_MODEL`
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let port = match std::env::var("OLLAMA_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| AgentError::Config(format!("OLLAMA_PORT is not a port: {raw}")))?,
            Err(_) => defaults.port,
        };

        Ok(Self {
            host: std::env::var("OLLAMA_HOST").unwrap_or(defaults.host),
            port,
            model: std::env::var("OLLAMA_MODEL").unwrap_or(defaults.model),
        })
    }

    /// Generation options targeting the configured model
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            model: self.model.clone(),
            ..GenerationOptions::default()
        }
    }
}

/// Ollama LLM provider
pub struct OllamaProvider {
    client: Ollama,
    config: OllamaConfig,
}

impl OllamaProvider {
    /// Create a new Ollama provider with custom host/port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::from_config(OllamaConfig {
            host: host.into(),
            port,
            ..Default::default()
        })
    }

    /// Create from configuration
    pub fn from_config(config: OllamaConfig) -> Self {
        Self {
            client: Ollama::new(config.host.clone(), config.port),
            config,
        }
    }

    pub const fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Convert agent messages to Ollama format
    fn convert_messages(messages: &[Message]) -> Vec<ChatMessage> {
        messages
            .iter()
            .map(|m| {
                let role = match m.role {
                    Role::System => MessageRole::System,
                    Role::Assistant => MessageRole::Assistant,
                    // Tool results appear as user context
                    Role::User | Role::Tool => MessageRole::User,
                };
                ChatMessage::new(role, m.content.clone())
            })
            .collect()
    }

    /// Convert Ollama response to agent completion
    fn convert_completion(response: ChatMessageResponse, model: &str) -> Completion {
        Completion {
            content: response.message.content,
            model: model.to_string(),
            usage: response.final_data.as_ref().map(|d| {
                let prompt = d.prompt_eval_count;
                let completion = d.eval_count;
                TokenUsage {
                    prompt_tokens: u32::try_from(prompt).unwrap_or(u32::MAX),
                    completion_tokens: u32::try_from(completion).unwrap_or(u32::MAX),
                    total_tokens: u32::try_from(prompt + completion).unwrap_or(u32::MAX),
                }
            }),
            finish_reason: Some(FinishReason::Stop),
        }
    }

    /// Build Ollama generation options
    fn build_options(opts: &GenerationOptions) -> OllamaOptions {
        OllamaOptions::default()
            .temperature(opts.temperature)
            .top_p(opts.top_p)
            .num_predict(i32::try_from(opts.max_tokens).unwrap_or(i32::MAX))
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn info(&self) -> Result<ProviderInfo> {
        let models = self.list_models().await.unwrap_or_default();

        Ok(ProviderInfo {
            name: "Ollama".into(),
            models,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        match self.client.list_local_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let request = ChatMessageRequest::new(options.model.clone(), Self::convert_messages(messages))
            .options(Self::build_options(options));

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| AgentError::Provider(e.to_string()))?;

        Ok(Self::convert_completion(response, &options.model))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let models = self
            .client
            .list_local_models()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        Ok(models
            .into_iter()
            .map(|m| ModelInfo {
                id: m.name.clone(),
                name: m.name,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = OllamaConfig::default();
        assert_eq!(config.host, "http://localhost");
        assert_eq!(config.port, 11434);
        assert_eq!(config.generation_options().model, "llama3.2");
    }

    #[test]
    fn test_message_conversion() {
        let messages = vec![
            Message::system("You are helpful."),
            Message::user("Hello"),
            Message::tool("[Tool result]\n42", None),
        ];

        let converted = OllamaProvider::convert_messages(&messages);
        assert_eq!(converted.len(), 3);
        assert_eq!(converted[2].content, "[Tool result]\n42");
    }
}
