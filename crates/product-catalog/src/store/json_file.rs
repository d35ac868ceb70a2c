//! JSON-file catalog
//!
//! Loads the whole file once at open and rewrites it after every create.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CatalogStore, next_id};
use crate::error::{CatalogError, Result};
use crate::model::{NewProduct, Product};

/// Catalog persisted as a pretty-printed JSON array
pub struct JsonFileCatalog {
    path: PathBuf,
    products: RwLock<Vec<Product>>,
}

impl JsonFileCatalog {
    /// Open the catalog at `path`.
    ///
    /// A missing or unreadable file starts an empty catalog; the file is
    /// created on the first write.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let products = load(&path).await;
        tracing::info!(path = %path.display(), count = products.len(), "Catalog loaded");

        Self {
            path,
            products: RwLock::new(products),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, products: &[Product]) -> Result<()> {
        let json = serde_json::to_string_pretty(products)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

async fn load(path: &Path) -> Vec<Product> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Catalog file not found, starting with empty catalog");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Catalog file unreadable, starting with empty catalog");
            return Vec::new();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Catalog file undecodable, starting with empty catalog");
        Vec::new()
    })
}

#[async_trait]
impl CatalogStore for JsonFileCatalog {
    async fn list_all(&self) -> Result<Vec<Product>> {
        Ok(self.products.read().await.clone())
    }

    async fn get_by_id(&self, id: u64) -> Result<Product> {
        self.products
            .read()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(CatalogError::NotFound(id))
    }

    async fn create(&self, product: NewProduct) -> Result<Product> {
        product.validate()?;

        let mut products = self.products.write().await;
        let created = product.into_product(next_id(&products));
        products.push(created.clone());

        if let Err(e) = self.persist(&products).await {
            products.pop();
            return Err(e);
        }

        tracing::debug!(id = created.id, path = %self.path.display(), "Product saved");
        Ok(created)
    }

    fn name(&self) -> &str {
        "json_file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("catalog-{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let catalog = JsonFileCatalog::open(temp_path()).await;
        assert!(catalog.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_file_is_empty() {
        let path = temp_path();
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let catalog = JsonFileCatalog::open(&path).await;
        assert!(catalog.list_all().await.unwrap().is_empty());

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_persists() {
        let path = temp_path();
        tokio::fs::write(
            &path,
            r#"[{"id": 7, "name": "Laptop", "price": 1000, "category": "Electronics", "in_stock": true}]"#,
        )
        .await
        .unwrap();

        let catalog = JsonFileCatalog::open(&path).await;
        let created = catalog
            .create(NewProduct::new("Keyboard", dec!(2500), "Electronics"))
            .await
            .unwrap();
        assert_eq!(created.id, 8);

        let reopened = JsonFileCatalog::open(&path).await;
        let products = reopened.list_all().await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].name, "Keyboard");
        assert_eq!(reopened.get_by_id(7).await.unwrap().price, dec!(1000));

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(raw.contains("\n  {"));

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
