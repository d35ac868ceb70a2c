//! Decision Engines
//!
//! A decision engine looks at the turn transcript and picks the next
//! [`Action`]: call a tool, or answer. The rule-based engine lives in
//! [`crate::classifier`]; [`ModelEngine`] delegates the choice to an
//! [`LlmProvider`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::ConversationContext;
use crate::error::Result;
use crate::message::{Message, Role};
use crate::provider::{GenerationOptions, LlmProvider};
use crate::tool::{ToolCall, ToolGateway, describe_tools};

/// What the engine wants to happen next
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Invoke a tool and come back with its result
    ToolInvocation(ToolCall),
    /// Final answer for this turn
    TextReply { content: String },
}

impl Action {
    pub fn reply(content: impl Into<String>) -> Self {
        Self::TextReply {
            content: content.into(),
        }
    }

    /// The tool call, if this action is one
    pub const fn tool_call(&self) -> Option<&ToolCall> {
        match self {
            Self::ToolInvocation(call) => Some(call),
            Self::TextReply { .. } => None,
        }
    }
}

/// Chooses the next action for a turn.
///
/// `history` is the transcript of the current turn; `context` belongs to the
/// conversation and outlives the turn.
#[async_trait]
pub trait DecisionEngine: Send + Sync {
    /// Engine name for logs and health output
    fn name(&self) -> &str;

    /// Decide the next action
    async fn decide(
        &self,
        history: &[Message],
        context: &mut ConversationContext,
    ) -> Result<Action>;
}

const MODEL_INSTRUCTIONS: &str = r#"When you need to use a tool, respond with a JSON block in this exact format:
```tool
{"tool": "tool_name", "arguments": {"arg1": "value1"}}
```

After receiving tool results, synthesize them into a short answer.
If you can answer directly without tools, do so."#;

/// Decision engine backed by a language model
pub struct ModelEngine {
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
    system_prompt: String,
}

impl ModelEngine {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        options: GenerationOptions,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            options,
            system_prompt: system_prompt.into(),
        }
    }

    /// Build the system prompt from the tools the gateway exposes
    pub async fn for_gateway(
        provider: Arc<dyn LlmProvider>,
        options: GenerationOptions,
        persona: &str,
        gateway: &dyn ToolGateway,
    ) -> Result<Self> {
        let schemas = gateway.list_tools().await?;
        let prompt = format!(
            "{persona}\n\n{MODEL_INSTRUCTIONS}\n\n{}",
            describe_tools(&schemas)
        );
        Ok(Self::new(provider, options, prompt))
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Rewrite the transcript into plain chat messages the model can read
    fn prompt_messages(&self, history: &[Message]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(&self.system_prompt));

        for message in history {
            let rewritten = match message.role {
                Role::Assistant if message.has_tool_calls() => {
                    let blocks: Vec<String> = message
                        .tool_calls
                        .iter()
                        .map(|call| {
                            let body = serde_json::json!({
                                "tool": call.name,
                                "arguments": call.arguments,
                            });
                            format!("```tool\n{body}\n```")
                        })
                        .collect();
                    Message::assistant(blocks.join("\n"))
                }
                Role::Tool => Message::tool(
                    format!("[Tool result]\n{}", message.content),
                    message.tool_call_id.clone(),
                ),
                _ => message.clone(),
            };
            messages.push(rewritten);
        }

        messages
    }
}

#[async_trait]
impl DecisionEngine for ModelEngine {
    fn name(&self) -> &str {
        "model"
    }

    async fn decide(
        &self,
        history: &[Message],
        _context: &mut ConversationContext,
    ) -> Result<Action> {
        let completion = self
            .provider
            .complete(&self.prompt_messages(history), &self.options)
            .await?;

        match parse_tool_call(&completion.content) {
            Some(call) => {
                tracing::debug!(tool = %call.name, model = %completion.model, "Model requested tool");
                Ok(Action::ToolInvocation(call))
            }
            None => Ok(Action::reply(completion.content.trim())),
        }
    }
}

/// Parse a tool call from model output
pub fn parse_tool_call(content: &str) -> Option<ToolCall> {
    // Look for ```tool ... ``` blocks
    let tool_start = "```tool";
    let tool_end = "```";

    if let Some(start_idx) = content.find(tool_start) {
        let after_marker = &content[start_idx + tool_start.len()..];
        if let Some(end_idx) = after_marker.find(tool_end) {
            let json_str = after_marker[..end_idx].trim();

            if let Ok(call) = serde_json::from_str::<ToolCall>(json_str) {
                return Some(with_call_id(call));
            }
        }
    }

    // Fallback: raw JSON with a "tool" key
    parse_inline_tool_call(content).map(with_call_id)
}

fn parse_inline_tool_call(content: &str) -> Option<ToolCall> {
    if !content.contains(r#""tool""#) {
        return None;
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;

    if end <= start {
        return None;
    }

    serde_json::from_str::<ToolCall>(&content[start..=end]).ok()
}

fn with_call_id(mut call: ToolCall) -> ToolCall {
    if call.id.is_none() {
        call.id = Some(uuid::Uuid::new_v4().to_string());
    }
    call
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Completion, ModelInfo, ProviderInfo};
    use crate::tool::{Arguments, ToolRegistry};
    use std::sync::Mutex;

    /// Provider that replays canned completions and records prompts
    struct ScriptedProvider {
        replies: Mutex<Vec<String>>,
        prompts: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedProvider {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().rev().map(|r| (*r).to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn info(&self) -> Result<ProviderInfo> {
            Ok(ProviderInfo {
                name: "scripted".into(),
                models: Vec::new(),
            })
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        async fn complete(
            &self,
            messages: &[Message],
            options: &GenerationOptions,
        ) -> Result<Completion> {
            self.prompts.lock().unwrap().push(messages.to_vec());
            Ok(Completion {
                content: self.replies.lock().unwrap().pop().unwrap_or_default(),
                model: options.model.clone(),
                usage: None,
                finish_reason: None,
            })
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_parse_tool_block() {
        let content = r#"Let me check that for you.
```tool
{"tool": "get_product", "arguments": {"product_id": 3}}
```"#;

        let call = parse_tool_call(content).unwrap();
        assert_eq!(call.name, "get_product");
        assert_eq!(call.number("product_id"), Some(3.0));
        assert!(call.id.is_some());
    }

    #[test]
    fn test_parse_inline_tool_call() {
        let call = parse_tool_call(r#"Sure: {"tool": "list_products", "arguments": {}}"#).unwrap();
        assert_eq!(call.name, "list_products");
        assert!(parse_tool_call("Here you go, no tools needed.").is_none());
    }

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_value(Action::reply("hi")).unwrap();
        assert_eq!(json["type"], "text_reply");
        assert_eq!(json["content"], "hi");

        let call = ToolCall::new("list_products", Arguments::new());
        let json = serde_json::to_value(Action::ToolInvocation(call)).unwrap();
        assert_eq!(json["type"], "tool_invocation");
        assert_eq!(json["name"], "list_products");
    }

    #[tokio::test]
    async fn test_model_engine_tool_then_reply() {
        let provider = Arc::new(ScriptedProvider::new(&[
            "```tool\n{\"tool\": \"calculator\", \"arguments\": {\"operation\": \"add\", \"a\": 1, \"b\": 2}}\n```",
            "  One plus two is 3.  ",
        ]));
        let registry = ToolRegistry::with_builtins();
        let engine = ModelEngine::for_gateway(
            provider.clone(),
            GenerationOptions::default(),
            "You manage a product catalog.",
            &registry,
        )
        .await
        .unwrap();
        assert!(engine.system_prompt().contains("### calculator"));

        let mut ctx = ConversationContext::new();
        let mut history = vec![Message::user("what is 1 plus 2")];

        let action = engine.decide(&history, &mut ctx).await.unwrap();
        let call = action.tool_call().unwrap().clone();
        assert_eq!(call.name, "calculator");

        history.push(Message::assistant_tool_call(call));
        history.push(Message::tool("3", None));
        let action = engine.decide(&history, &mut ctx).await.unwrap();
        assert_eq!(action, Action::reply("One plus two is 3."));

        let prompts = provider.prompts.lock().unwrap();
        let second = &prompts[1];
        assert_eq!(second[0].role, Role::System);
        assert!(second[2].content.starts_with("```tool"));
        assert_eq!(second[3].content, "[Tool result]\n3");
    }
}
