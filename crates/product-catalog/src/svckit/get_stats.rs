//! Get Stats Tool

use std::sync::Arc;

use agent_core::tool::names;
use agent_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};
use async_trait::async_trait;

use crate::store::CatalogStore;

/// Tool reporting product count and average price
pub struct GetStatsTool {
    store: Arc<dyn CatalogStore>,
}

impl GetStatsTool {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GetStatsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: names::GET_STATS.into(),
            description: "Get catalog statistics: total product count and average price.".into(),
            parameters: Vec::new(),
            category: Some("catalog".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, _call: &ToolCall) -> CoreResult<ToolResult> {
        let stats = self.store.stats().await?;
        ToolResult::json(names::GET_STATS, &stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCatalog;
    use agent_core::ConversationContext;
    use agent_core::formatter::format_tool_output;
    use agent_core::tool::Arguments;

    #[tokio::test]
    async fn test_empty_catalog_stats() {
        let tool = GetStatsTool::new(Arc::new(MemoryCatalog::new()));
        let result = tool
            .execute(&ToolCall::new(names::GET_STATS, Arguments::new()))
            .await
            .unwrap();

        let stats: serde_json::Value = serde_json::from_str(&result.output).unwrap();
        assert_eq!(stats["total_count"], 0);
        assert_eq!(stats["average_price"], serde_json::json!(0.0));

        let reply = format_tool_output(&result.output, &mut ConversationContext::new());
        assert!(reply.contains("0 products"));
    }
}
