//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool validation failed
    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    /// Tool execution failed
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Transport to a remote tool server failed
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Maximum decisions reached in a single turn
    #[error("Maximum iterations ({0}) reached")]
    MaxIterations(usize),

    /// Parse error (e.g., tool call parsing)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Check if error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_) | Self::Gateway(_)
        )
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(msg) => format!("The AI service encountered an error: {msg}"),
            Self::ProviderUnavailable(_) => {
                "The AI service is currently unavailable. Please try again.".into()
            }
            Self::ToolNotFound(name) => format!("The tool '{name}' is not available."),
            Self::ToolValidation(msg) => format!("Invalid tool input: {msg}"),
            Self::ToolExecution(msg) => format!("Tool error: {msg}"),
            Self::Gateway(_) => "The tool server could not be reached. Please try again.".into(),
            Self::MaxIterations(_) => {
                "The request took too long to process. Please try a simpler query.".into()
            }
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(AgentError::Gateway("connection refused".into()).is_retryable());
        assert!(!AgentError::ToolNotFound("nope".into()).is_retryable());
    }

    #[test]
    fn test_user_message() {
        let err = AgentError::ToolNotFound("teleport".into());
        assert_eq!(err.user_message(), "The tool 'teleport' is not available.");
        assert_eq!(
            AgentError::Parse("bad".into()).user_message(),
            "An unexpected error occurred."
        );
    }
}
