//! Turn Loop
//!
//! Drives one dialogue turn as a small state machine:
//!
//! ```text
//! AwaitingUserInput ─► Classifying ─► InvokingTool ─► AwaitingToolResult ─┐
//!                          ▲   │            │                             │
//!                          │   │            └─ gateway failure ─┐         │
//!                          │   └──────── text reply ──────────► Replied   │
//!                          └──────────────────────────────────────────────┘
//! ```
//!
//! The engine is consulted again after every tool result, so multi-hop tool
//! chains work even though the rule table only ever needs one hop.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::{Action, DecisionEngine};
use crate::error::{AgentError, Result};
use crate::formatter::render_raw;
use crate::message::{Conversation, Message};
use crate::session::Session;
use crate::tool::{ToolCall, ToolGateway};

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Maximum engine decisions per turn before giving up
    pub max_iterations: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self { max_iterations: 10 }
    }
}

/// Where a turn currently stands
#[derive(Clone, Debug)]
pub enum TurnState {
    AwaitingUserInput,
    Classifying,
    InvokingTool(ToolCall),
    AwaitingToolResult(Message),
    Replied(String),
}

/// Result of one turn
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// Text shown to the user
    pub reply: String,

    /// Names of the tools invoked, in order
    pub tool_calls: Vec<String>,
}

/// Runs turns against a decision engine and a tool gateway
pub struct Agent {
    engine: Arc<dyn DecisionEngine>,
    gateway: Arc<dyn ToolGateway>,
    config: AgentConfig,
}

impl Agent {
    pub fn new(
        engine: Arc<dyn DecisionEngine>,
        gateway: Arc<dyn ToolGateway>,
        config: AgentConfig,
    ) -> Self {
        Self {
            engine,
            gateway,
            config,
        }
    }

    /// Create with default configuration
    pub fn with_defaults(engine: Arc<dyn DecisionEngine>, gateway: Arc<dyn ToolGateway>) -> Self {
        Self::new(engine, gateway, AgentConfig::default())
    }

    /// Handle one user utterance within `session`.
    ///
    /// Tool failures become replies; only engine failures and runaway tool
    /// chains surface as errors.
    pub async fn handle(&self, session: &mut Session, utterance: &str) -> Result<TurnOutcome> {
        let mut transcript = Conversation::new();
        let mut tool_calls = Vec::new();
        let mut decisions = 0;
        let mut state = TurnState::AwaitingUserInput;

        loop {
            state = match state {
                TurnState::AwaitingUserInput => {
                    transcript.push(Message::user(utterance));
                    TurnState::Classifying
                }

                TurnState::Classifying => {
                    decisions += 1;
                    if decisions > self.config.max_iterations {
                        return Err(AgentError::MaxIterations(self.config.max_iterations));
                    }

                    match self
                        .engine
                        .decide(transcript.messages(), &mut session.context)
                        .await?
                    {
                        Action::ToolInvocation(call) => TurnState::InvokingTool(call),
                        Action::TextReply { content } => TurnState::Replied(content),
                    }
                }

                TurnState::InvokingTool(call) => {
                    tracing::debug!(tool = %call.name, session = %session.id, "Invoking tool");
                    tool_calls.push(call.name.clone());

                    let invoked = self.gateway.invoke(&call.name, &call.arguments).await;
                    let call_id = call.id.clone();
                    transcript.push(Message::assistant_tool_call(call));

                    match invoked {
                        Ok(output) => TurnState::AwaitingToolResult(Message::tool(output, call_id)),
                        Err(e) => {
                            tracing::warn!(error = %e, session = %session.id, "Tool invocation failed");
                            TurnState::Replied(render_raw(&format!("System Error: {e}")))
                        }
                    }
                }

                TurnState::AwaitingToolResult(result) => {
                    transcript.push(result);
                    TurnState::Classifying
                }

                TurnState::Replied(reply) => {
                    session.touch();
                    return Ok(TurnOutcome { reply, tool_calls });
                }
            };
        }
    }

    /// One-off question in a throwaway session
    pub async fn ask(&self, question: &str) -> Result<String> {
        let mut session = Session::new();
        Ok(self.handle(&mut session, question).await?.reply)
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }
}

/// Builder for Agent configuration
#[derive(Default)]
pub struct AgentBuilder {
    engine: Option<Arc<dyn DecisionEngine>>,
    gateway: Option<Arc<dyn ToolGateway>>,
    config: AgentConfig,
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engine(mut self, engine: Arc<dyn DecisionEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn gateway(mut self, gateway: Arc<dyn ToolGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub const fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let engine = self
            .engine
            .ok_or_else(|| AgentError::Config("Decision engine is required".into()))?;
        let gateway = self
            .gateway
            .ok_or_else(|| AgentError::Config("Tool gateway is required".into()))?;

        Ok(Agent::new(engine, gateway, self.config))
    }
}
