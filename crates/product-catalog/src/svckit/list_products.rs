//! List Products Tool

use std::sync::Arc;

use agent_core::tool::names;
use agent_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};
use async_trait::async_trait;

use crate::store::CatalogStore;

/// Tool returning the whole catalog as a JSON array
pub struct ListProductsTool {
    store: Arc<dyn CatalogStore>,
}

impl ListProductsTool {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ListProductsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: names::LIST_PRODUCTS.into(),
            description: "List all available products in the catalog.".into(),
            parameters: Vec::new(),
            category: Some("catalog".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, _call: &ToolCall) -> CoreResult<ToolResult> {
        let products = self.store.list_all().await?;
        ToolResult::json(names::LIST_PRODUCTS, &products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCatalog;
    use agent_core::tool::Arguments;

    #[tokio::test]
    async fn test_lists_in_order() {
        let tool = ListProductsTool::new(Arc::new(MemoryCatalog::sample()));
        let result = tool
            .execute(&ToolCall::new(names::LIST_PRODUCTS, Arguments::new()))
            .await
            .unwrap();

        assert!(result.success);
        let items: Vec<serde_json::Value> = serde_json::from_str(&result.output).unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(items[0]["name"], "Laptop");
        assert_eq!(items[4]["id"], 5);
    }
}
