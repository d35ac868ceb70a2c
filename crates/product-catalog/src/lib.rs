//! # product-catalog
//!
//! Product catalog storage and the tools that expose it to the assistant.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │  ToolRegistry                                         │
//! │   list_products ─┐                                    │
//! │   get_product   ─┼──▶ CatalogStore ──▶ memory | JSON  │
//! │   add_product   ─┤                     | SQLite        │
//! │   get_stats     ─┘                                    │
//! │   calculator, formatter (built in)                    │
//! └───────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod model;
pub mod store;
pub mod svckit;

pub use error::{CatalogError, Result};
pub use model::{CatalogStats, NewProduct, Product};
pub use store::{CatalogStore, JsonFileCatalog, MemoryCatalog, SqliteCatalog};
pub use svckit::catalog_registry;

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{AddProductTool, GetProductTool, GetStatsTool, ListProductsTool};
}

/// Persona for the model-backed decision engine
pub const CATALOG_ASSISTANT_PROMPT: &str = r"You are a helpful assistant for a product catalog.

You can list products, look up a product by its ID, add new products, report
catalog statistics, and do arithmetic such as applying a discount to a price.

Always use the catalog tools to answer questions about products; never invent
products, prices or IDs. When a product is not found, say so plainly.
Keep answers short.";
