//! Service Kit - Agent Tools
//!
//! Catalog tools that implement `agent_core::Tool` over a [`CatalogStore`].

mod add_product;
mod get_product;
mod get_stats;
mod list_products;

pub use add_product::AddProductTool;
pub use get_product::GetProductTool;
pub use get_stats::GetStatsTool;
pub use list_products::ListProductsTool;

use std::str::FromStr;
use std::sync::Arc;

use agent_core::{AgentError, Result as CoreResult, ToolCall, ToolRegistry};
use rust_decimal::Decimal;

use crate::store::CatalogStore;

/// Registry with the built-in tools plus every catalog tool over `store`
pub fn catalog_registry(store: Arc<dyn CatalogStore>) -> ToolRegistry {
    let mut registry = ToolRegistry::with_builtins();
    registry.register(ListProductsTool::new(Arc::clone(&store)));
    registry.register(GetProductTool::new(Arc::clone(&store)));
    registry.register(AddProductTool::new(Arc::clone(&store)));
    registry.register(GetStatsTool::new(store));
    registry
}

/// Whole, non-negative number; numeric strings are accepted too
fn id_argument(call: &ToolCall, key: &str) -> CoreResult<u64> {
    let value = call
        .arguments
        .get(key)
        .ok_or_else(|| AgentError::ToolValidation(format!("Missing required parameter: {key}")))?;

    if let Some(id) = value.as_u64() {
        return Ok(id);
    }

    let digits = value.as_str().map(str::trim).unwrap_or_default();
    match digits.parse() {
        Ok(id) => Ok(id),
        Err(_) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => Err(
            AgentError::ToolValidation(format!("{key} {digits} is out of range")),
        ),
        Err(_) => Err(AgentError::ToolValidation(format!(
            "{key} must be a whole number, got {value}"
        ))),
    }
}

/// Decimal amount from a JSON number or numeric string
fn decimal_argument(call: &ToolCall, key: &str) -> CoreResult<Decimal> {
    let value = call
        .arguments
        .get(key)
        .ok_or_else(|| AgentError::ToolValidation(format!("Missing required parameter: {key}")))?;

    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64().and_then(|f| Decimal::try_from(f).ok()),
        serde_json::Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    };

    parsed.ok_or_else(|| AgentError::ToolValidation(format!("{key} must be a number, got {value}")))
}
