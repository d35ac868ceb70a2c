//! Application State

use std::sync::Arc;

use agent_core::{
    Agent, AgentBuilder, DecisionEngine, LlmProvider, MemorySessionStore, ModelEngine,
    RuleBasedEngine, ToolGateway, ToolRegistry,
};
use agent_runtime::{HttpToolGateway, OllamaConfig, OllamaProvider};
use product_catalog::{
    CATALOG_ASSISTANT_PROMPT, CatalogStore, JsonFileCatalog, MemoryCatalog, SqliteCatalog,
    catalog_registry,
};

use crate::config::{EngineKind, ServerConfig};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Turn loop wired to the configured engine and gateway
    pub agent: Arc<Agent>,

    /// Conversations by id
    pub sessions: Arc<MemorySessionStore>,

    /// Tools this process serves on `/api/tools`
    pub tools: Arc<ToolRegistry>,

    /// LLM provider, when the model-backed engine is active
    pub provider: Option<Arc<dyn LlmProvider>>,
}

impl AppState {
    /// Wire catalog, tools, gateway and engine from configuration
    pub async fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let store = open_catalog(config).await?;
        tracing::info!(store = store.name(), "Catalog ready");

        let tools = Arc::new(catalog_registry(store));
        tracing::info!("Registered {} tools: {}", tools.len(), tools.names().join(", "));

        let gateway: Arc<dyn ToolGateway> = match &config.tool_server_url {
            Some(url) => {
                tracing::info!(%url, "Invoking tools over HTTP");
                Arc::new(HttpToolGateway::new(url.as_str(), config.tool_timeout)?) as Arc<dyn ToolGateway>
            }
            None => Arc::clone(&tools) as Arc<dyn ToolGateway>,
        };

        let (engine, provider): (Arc<dyn DecisionEngine>, Option<Arc<dyn LlmProvider>>) =
            match config.engine {
                EngineKind::Rules => (Arc::new(RuleBasedEngine::new()) as Arc<dyn DecisionEngine>, None),
                EngineKind::Ollama => {
                    let ollama = OllamaConfig::from_env()?;
                    let provider = Arc::new(OllamaProvider::from_config(ollama.clone()));

                    if provider.health_check().await.unwrap_or(false) {
                        tracing::info!(model = %ollama.model, "✓ Connected to Ollama");
                    } else {
                        tracing::warn!("⚠ Ollama not available - queries will fail");
                        tracing::warn!("  Make sure Ollama is running: ollama serve");
                    }

                    let engine = ModelEngine::for_gateway(
                        provider.clone(),
                        ollama.generation_options(),
                        CATALOG_ASSISTANT_PROMPT,
                        gateway.as_ref(),
                    )
                    .await?;
                    (
                        Arc::new(engine) as Arc<dyn DecisionEngine>,
                        Some(provider as Arc<dyn LlmProvider>),
                    )
                }
            };

        let agent = AgentBuilder::new()
            .engine(engine)
            .gateway(gateway)
            .max_iterations(config.max_iterations)
            .build()?;
        tracing::info!(engine = agent.engine_name(), "Agent ready");

        Ok(Self {
            agent: Arc::new(agent),
            sessions: Arc::new(MemorySessionStore::with_limits(
                config.session_idle_timeout,
                config.max_sessions,
            )),
            tools,
            provider,
        })
    }
}

/// Database first, then JSON file, then the sample catalog
async fn open_catalog(config: &ServerConfig) -> anyhow::Result<Arc<dyn CatalogStore>> {
    let Some(url) = &config.database_url else {
        let store: Arc<dyn CatalogStore> = match &config.catalog_file {
            Some(path) => Arc::new(JsonFileCatalog::open(path).await),
            None => Arc::new(MemoryCatalog::sample()),
        };
        return Ok(store);
    };

    let catalog = SqliteCatalog::connect(url).await?;
    if let Some(path) = &config.catalog_file {
        if let Err(e) = catalog.import_json(path).await {
            tracing::warn!(path = %path.display(), error = %e, "Catalog import skipped");
        }
    }
    Ok(Arc::new(catalog))
}
