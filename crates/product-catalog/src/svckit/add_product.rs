//! Add Product Tool

use std::sync::Arc;

use agent_core::extract::DEFAULT_CATEGORY;
use agent_core::tool::{ParameterSchema, names};
use agent_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};
use async_trait::async_trait;

use super::decimal_argument;
use crate::model::NewProduct;
use crate::store::CatalogStore;

/// Tool adding a product; the id is assigned by the store
pub struct AddProductTool {
    store: Arc<dyn CatalogStore>,
}

impl AddProductTool {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for AddProductTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: names::ADD_PRODUCT.into(),
            description: "Add a new product to the catalog. The ID is generated automatically.".into(),
            parameters: vec![
                ParameterSchema::required("name", "string", "Product name"),
                ParameterSchema::required("price", "number", "Unit price in USD"),
                ParameterSchema::optional(
                    "category",
                    "string",
                    "Product category",
                    serde_json::json!(DEFAULT_CATEGORY),
                ),
                ParameterSchema::optional(
                    "in_stock",
                    "boolean",
                    "Whether the product is available",
                    serde_json::json!(true),
                ),
            ],
            category: Some("catalog".into()),
            has_side_effects: true,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let product = NewProduct {
            name: call.string("name").unwrap_or_default().trim().to_string(),
            price: decimal_argument(call, "price")?,
            category: call.string("category").unwrap_or(DEFAULT_CATEGORY).to_string(),
            in_stock: call
                .arguments
                .get("in_stock")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(true),
        };

        let created = self.store.create(product).await?;
        ToolResult::json(names::ADD_PRODUCT, &created)
    }
}
