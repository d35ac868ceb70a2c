//! # agent-core
//!
//! Conversational decision engine for a product catalog assistant.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         Agent (turn loop)                        │
//! │  ┌──────────────────┐   ┌─────────────┐   ┌───────────────────┐  │
//! │  │  DecisionEngine  │   │ ToolGateway │   │ ConversationCtx   │  │
//! │  │  rules | model   │──▶│ local | http│   │ (per session)     │  │
//! │  └──────────────────┘   └─────────────┘   └───────────────────┘  │
//! │     classifier ─ extract          formatter ◀── tool result      │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The rule-based engine classifies utterances with an ordered intent table
//! and renders tool results itself. The model-based engine hands both jobs
//! to an [`LlmProvider`]. Either one plugs into the same [`Agent`].

pub mod classifier;
pub mod context;
pub mod engine;
pub mod error;
pub mod extract;
pub mod formatter;
pub mod message;
pub mod provider;
pub mod reasoning;
pub mod session;
pub mod tool;

pub use classifier::{Intent, RuleBasedEngine, classify};
pub use context::{ConversationContext, PendingDiscount};
pub use engine::{Action, DecisionEngine, ModelEngine};
pub use error::{AgentError, Result};
pub use message::{Message, Role};
pub use provider::LlmProvider;
pub use reasoning::{Agent, AgentBuilder, TurnOutcome};
pub use session::{MemorySessionStore, Session, SessionId};
pub use tool::{Arguments, Tool, ToolCall, ToolGateway, ToolRegistry, ToolResult, ToolSchema};
