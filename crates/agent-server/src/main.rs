//! Catalog assistant HTTP server
//!
//! Axum-based server exposing the conversational query API and the catalog
//! tools.

use agent_server::{ServerConfig, init_tracing, router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();
    init_tracing("info,tower_http=debug");

    let config = ServerConfig::from_env()?;
    let state = AppState::from_config(&config).await?;
    let app = router(state, &config.static_dir);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 Catalog assistant running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health              - Health check");
    tracing::info!("  POST /api/v1/agent/query  - Ask the assistant");
    tracing::info!("  GET  /api/tools           - List tools");
    tracing::info!("  POST /api/tools/{{name}}    - Invoke a tool");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
