//! # agent-server
//!
//! HTTP front door for the catalog assistant: the query API, the tool API
//! other processes use as a remote gateway, and a static chat page.

pub mod config;
pub mod handlers;
pub mod state;

use std::path::Path;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::handlers::{health_check, invoke_tool, list_tools, query_handler};
use crate::state::AppState;

pub use config::{EngineKind, ServerConfig};

/// Install the global subscriber; `RUST_LOG` overrides `default_filter`
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Build the application router
pub fn router(state: AppState, static_dir: &Path) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(health_check))
        // Agent API
        .route("/api/v1/agent/query", post(query_handler))
        // Tool API
        .route("/api/tools", get(list_tools))
        .route("/api/tools/{name}", post(invoke_tool))
        // Static chat page
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
