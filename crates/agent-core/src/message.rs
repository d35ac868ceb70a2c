//! Conversation Messages
//!
//! Message format shared by the decision engines and the turn loop. A
//! [`Conversation`] here is the transcript of a single turn: the user's
//! utterance, any tool calls the engine made, and their results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tool::ToolCall;

/// Role of a message sender
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System prompt/instructions
    System,
    /// User input
    User,
    /// Assistant (engine) response
    Assistant,
    /// Tool result (injected as context)
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::Tool => write!(f, "tool"),
        }
    }
}

/// A single message in a conversation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,

    /// Text content
    pub content: String,

    /// Tool calls requested by an assistant message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,

    /// Call this message answers (tool messages only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Timestamp
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new message
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create an assistant message that requests a tool call
    pub fn assistant_tool_call(call: ToolCall) -> Self {
        let mut msg = Self::new(Role::Assistant, String::new());
        msg.tool_calls.push(call);
        msg
    }

    /// Create a tool result message
    pub fn tool(content: impl Into<String>, tool_call_id: Option<String>) -> Self {
        let mut msg = Self::new(Role::Tool, content);
        msg.tool_call_id = tool_call_id;
        msg
    }

    /// Whether this message carries tool calls
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Transcript of one dialogue turn
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Get all messages
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Get the last message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::Arguments;

    #[test]
    fn test_message_creation() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello");
        assert!(!msg.has_tool_calls());
    }

    #[test]
    fn test_conversation() {
        let mut conv = Conversation::new();
        conv.push(Message::user("show all products"));
        conv.push(Message::assistant_tool_call(ToolCall::new(
            "list_products",
            Arguments::new(),
        )));
        conv.push(Message::tool("[]", None));

        assert_eq!(conv.len(), 3);
        assert_eq!(conv.last().map(|m| &m.role), Some(&Role::Tool));
        assert!(conv.messages()[1].has_tool_calls());
    }
}
