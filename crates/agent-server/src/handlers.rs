//! HTTP Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use agent_core::{
    AgentError, LlmProvider, SessionId, ToolGateway,
    tool::{Arguments, ToolSchema},
};
use agent_runtime::{ToolFailure, ToolOutput};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub engine: String,
    pub tools: usize,

    /// Only reported for the model-backed engine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_connected: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub query: String,
    pub response: String,
    pub tool_calls: Vec<String>,
    pub conversation_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError<T> = (StatusCode, Json<T>);

fn error_response(status: StatusCode, error: impl Into<String>, code: &str) -> ApiError<ErrorResponse> {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_connected = match &state.provider {
        Some(provider) => Some(provider.health_check().await.unwrap_or(false)),
        None => None,
    };

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        engine: state.agent.engine_name().to_string(),
        tools: state.tools.len(),
        model_connected,
    })
}

/// Run one conversational turn
pub async fn query_handler(
    State(state): State<AppState>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError<ErrorResponse>> {
    let query = payload.query.trim();
    if query.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Query must not be empty",
            "EMPTY_QUERY",
        ));
    }

    let requested = payload
        .conversation_id
        .filter(|id| !id.trim().is_empty())
        .map(SessionId::from_string);
    let (conversation_id, session) = state.sessions.open(requested).await;

    // Holding the lock serializes turns within one conversation
    let mut session = session.lock().await;
    let outcome = state.agent.handle(&mut session, query).await.map_err(|e| {
        tracing::error!(conversation = %conversation_id, "Agent error: {}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, e.user_message(), "AGENT_ERROR")
    })?;

    Ok(Json(QueryResponse {
        query: query.to_string(),
        response: outcome.reply,
        tool_calls: outcome.tool_calls,
        conversation_id: conversation_id.to_string(),
    }))
}

/// Tool discovery
pub async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolSchema>> {
    Json(state.tools.schemas())
}

/// Invoke one of this process's tools
pub async fn invoke_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(arguments): Json<Arguments>,
) -> Result<Json<ToolOutput>, ApiError<ToolFailure>> {
    match state.tools.invoke(&name, &arguments).await {
        Ok(output) => Ok(Json(ToolOutput { output })),
        Err(e) => {
            tracing::warn!(tool = %name, "Tool invocation failed: {}", e);
            let status = match &e {
                AgentError::ToolNotFound(_) => StatusCode::NOT_FOUND,
                AgentError::ToolValidation(_) => StatusCode::BAD_REQUEST,
                AgentError::ToolExecution(_) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            Err((status, Json(ToolFailure::from_error(&e))))
        }
    }
}
