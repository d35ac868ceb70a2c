//! # agent-runtime
//!
//! Runtime integrations for the catalog assistant.
//!
//! - **Ollama** (default feature): local LLM inference behind the
//!   model-backed decision engine
//! - **HTTP tool gateway**: invoke tools served by another process
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::{HttpToolGateway, OllamaProvider};
//!
//! let gateway = HttpToolGateway::new("http://localhost:3000", Duration::from_secs(30))?;
//! let agent = AgentBuilder::new()
//!     .engine(Arc::new(RuleBasedEngine::new()))
//!     .gateway(Arc::new(gateway))
//!     .build()?;
//! ```

pub mod http_gateway;
#[cfg(feature = "ollama")]
pub mod ollama;

pub use http_gateway::{HttpToolGateway, ToolFailure, ToolOutput};
#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};
