//! Catalog Storage
//!
//! Abstractions and implementations for where products live.

mod json_file;
mod memory;
mod sqlite;

pub use json_file::JsonFileCatalog;
pub use memory::MemoryCatalog;
pub use sqlite::SqliteCatalog;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{CatalogStats, NewProduct, Product};

/// Catalog storage backend (Strategy pattern)
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All products in insertion order
    async fn list_all(&self) -> Result<Vec<Product>>;

    /// A single product, or `CatalogError::NotFound`
    async fn get_by_id(&self, id: u64) -> Result<Product>;

    /// Store a new product under the next free id
    async fn create(&self, product: NewProduct) -> Result<Product>;

    /// Count and mean price
    async fn stats(&self) -> Result<CatalogStats> {
        Ok(CatalogStats::from_products(&self.list_all().await?))
    }

    /// Backend name
    fn name(&self) -> &str;
}

/// One past the highest id in use, 1 for an empty catalog
fn next_id(products: &[Product]) -> u64 {
    products.iter().map(|p| p.id).max().map_or(1, |max| max + 1)
}
