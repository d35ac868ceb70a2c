//! Remote Tool Gateway
//!
//! `ToolGateway` over HTTP, talking to another process that serves
//! `GET /api/tools` and `POST /api/tools/{name}`.

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    tool::{Arguments, ToolGateway, ToolSchema},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Successful tool invocation body
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolOutput {
    pub output: String,
}

/// Failed tool invocation body
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolFailure {
    pub error: String,
    pub code: String,
}

impl ToolFailure {
    pub const NOT_FOUND: &'static str = "TOOL_NOT_FOUND";
    pub const INVALID_ARGUMENTS: &'static str = "INVALID_ARGUMENTS";
    pub const FAILED: &'static str = "TOOL_FAILED";

    /// Wire form of a tool error
    pub fn from_error(err: &AgentError) -> Self {
        let (code, error) = match err {
            AgentError::ToolNotFound(name) => (Self::NOT_FOUND, name.clone()),
            AgentError::ToolValidation(msg) => (Self::INVALID_ARGUMENTS, msg.clone()),
            AgentError::ToolExecution(msg) => (Self::FAILED, msg.clone()),
            other => (Self::FAILED, other.to_string()),
        };
        Self {
            error,
            code: code.into(),
        }
    }

    /// Back to the error the remote side raised
    pub fn into_error(self) -> AgentError {
        match self.code.as_str() {
            Self::NOT_FOUND => AgentError::ToolNotFound(self.error),
            Self::INVALID_ARGUMENTS => AgentError::ToolValidation(self.error),
            Self::FAILED => AgentError::ToolExecution(self.error),
            _ => AgentError::Gateway(format!("{}: {}", self.code, self.error)),
        }
    }
}

/// Tool gateway backed by a remote tool server
pub struct HttpToolGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpToolGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn tools_url(&self) -> String {
        format!("{}/api/tools", self.base_url)
    }
}

fn transport_error(err: &reqwest::Error) -> AgentError {
    if err.is_timeout() {
        AgentError::Gateway(format!("request timed out: {err}"))
    } else {
        AgentError::Gateway(err.to_string())
    }
}

#[async_trait]
impl ToolGateway for HttpToolGateway {
    async fn invoke(&self, name: &str, arguments: &Arguments) -> Result<String> {
        let url = format!("{}/{name}", self.tools_url());
        tracing::debug!(%url, "Invoking remote tool");

        let response = self
            .client
            .post(&url)
            .json(arguments)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if status.is_success() {
            let body: ToolOutput = response.json().await.map_err(|e| transport_error(&e))?;
            return Ok(body.output);
        }

        match response.json::<ToolFailure>().await {
            Ok(failure) => Err(failure.into_error()),
            Err(_) => Err(AgentError::Gateway(format!("tool server returned {status}"))),
        }
    }

    async fn list_tools(&self) -> Result<Vec<ToolSchema>> {
        let response = self
            .client
            .get(self.tools_url())
            .send()
            .await
            .map_err(|e| transport_error(&e))?
            .error_for_status()
            .map_err(|e| transport_error(&e))?;

        response.json().await.map_err(|e| transport_error(&e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::ToolRegistry;
    use axum::{
        Json, Router,
        extract::{Path, State},
        http::StatusCode,
        routing::{get, post},
    };
    use std::sync::Arc;

    async fn list(State(tools): State<Arc<ToolRegistry>>) -> Json<Vec<ToolSchema>> {
        Json(tools.schemas())
    }

    async fn invoke(
        State(tools): State<Arc<ToolRegistry>>,
        Path(name): Path<String>,
        Json(arguments): Json<Arguments>,
    ) -> std::result::Result<Json<ToolOutput>, (StatusCode, Json<ToolFailure>)> {
        tools
            .invoke(&name, &arguments)
            .await
            .map(|output| Json(ToolOutput { output }))
            .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, Json(ToolFailure::from_error(&e))))
    }

    async fn serve() -> String {
        let app = Router::new()
            .route("/api/tools", get(list))
            .route("/api/tools/{name}", post(invoke))
            .with_state(Arc::new(ToolRegistry::with_builtins()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });
        format!("http://{addr}/")
    }

    fn args(pairs: &[(&str, serde_json::Value)]) -> Arguments {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_remote_invoke_and_discovery() {
        let gateway = HttpToolGateway::new(serve().await, Duration::from_secs(5)).unwrap();
        assert!(!gateway.base_url().ends_with('/'));

        let names = gateway.tool_names().await.unwrap();
        assert_eq!(names, vec!["calculator", "formatter"]);

        let output = gateway
            .invoke(
                "calculator",
                &args(&[
                    ("operation", serde_json::json!("multiply")),
                    ("a", serde_json::json!(6)),
                    ("b", serde_json::json!(7)),
                ]),
            )
            .await
            .unwrap();
        assert_eq!(output, "42");
    }

    #[tokio::test]
    async fn test_remote_errors_keep_their_kind() {
        let gateway = HttpToolGateway::new(serve().await, Duration::from_secs(5)).unwrap();

        let err = gateway.invoke("teleport", &Arguments::new()).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolNotFound(name) if name == "teleport"));

        let err = gateway
            .invoke(
                "calculator",
                &args(&[
                    ("operation", serde_json::json!("divide")),
                    ("a", serde_json::json!(1)),
                    ("b", serde_json::json!(0)),
                ]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ToolExecution(msg) if msg == "Division by zero"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_gateway_error() {
        let gateway = HttpToolGateway::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();

        let err = gateway.invoke("calculator", &Arguments::new()).await.unwrap_err();
        assert!(matches!(err, AgentError::Gateway(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_unknown_failure_code() {
        let failure = ToolFailure {
            error: "boom".into(),
            code: "SOMETHING_ELSE".into(),
        };
        assert!(matches!(failure.into_error(), AgentError::Gateway(msg) if msg == "SOMETHING_ELSE: boom"));
    }
}
