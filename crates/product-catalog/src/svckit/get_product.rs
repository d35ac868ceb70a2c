//! Get Product Tool

use std::sync::Arc;

use agent_core::tool::{ParameterSchema, names};
use agent_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};
use async_trait::async_trait;

use super::id_argument;
use crate::store::CatalogStore;

/// Tool fetching one product by id
pub struct GetProductTool {
    store: Arc<dyn CatalogStore>,
}

impl GetProductTool {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GetProductTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: names::GET_PRODUCT.into(),
            description: "Get a single product by its unique ID. Fails if the product does not exist.".into(),
            parameters: vec![ParameterSchema::required(
                "product_id",
                "integer",
                "Numeric product identifier",
            )],
            category: Some("catalog".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let id = id_argument(call, "product_id")?;
        let product = self.store.get_by_id(id).await?;
        ToolResult::json(names::GET_PRODUCT, &product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCatalog;
    use agent_core::AgentError;
    use agent_core::tool::Arguments;

    fn lookup(id: serde_json::Value) -> ToolCall {
        ToolCall::new(
            names::GET_PRODUCT,
            Arguments::from([("product_id".to_string(), id)]),
        )
    }

    #[tokio::test]
    async fn test_found() {
        let tool = GetProductTool::new(Arc::new(MemoryCatalog::sample()));
        let result = tool.execute(&lookup(serde_json::json!(2))).await.unwrap();

        let product: serde_json::Value = serde_json::from_str(&result.output).unwrap();
        assert_eq!(product["id"], 2);
        assert_eq!(product["name"], "Wireless Mouse");
    }

    #[tokio::test]
    async fn test_not_found() {
        let tool = GetProductTool::new(Arc::new(MemoryCatalog::sample()));
        let err = tool.execute(&lookup(serde_json::json!(99))).await.unwrap_err();

        assert!(matches!(err, AgentError::ToolExecution(msg) if msg.contains("99")));
    }
}
