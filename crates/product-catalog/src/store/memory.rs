//! In-memory catalog
//!
//! For testing and demo purposes. Optionally seeded with a handful of
//! realistic products.

use async_trait::async_trait;
use rust_decimal_macros::dec;
use tokio::sync::RwLock;

use super::{CatalogStore, next_id};
use crate::error::{CatalogError, Result};
use crate::model::{NewProduct, Product};

/// Catalog held in process memory
#[derive(Default)]
pub struct MemoryCatalog {
    products: RwLock<Vec<Product>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: RwLock::new(products),
        }
    }

    /// Catalog seeded with sample products
    pub fn sample() -> Self {
        let seed = [
            ("Laptop", dec!(1200), "Electronics"),
            ("Wireless Mouse", dec!(25.5), "Accessories"),
            ("Mechanical Keyboard", dec!(89.99), "Accessories"),
            ("Monitor", dec!(299), "Electronics"),
            ("Desk Chair", dec!(150), "Furniture"),
        ];

        let products = seed
            .into_iter()
            .zip(1..)
            .map(|((name, price, category), id)| NewProduct::new(name, price, category).into_product(id))
            .collect();

        Self::with_products(products)
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
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

        tracing::debug!(id = created.id, name = %created.name, "Product created");
        Ok(created)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_sample_catalog() {
        let catalog = MemoryCatalog::sample();
        let products = catalog.list_all().await.unwrap();

        assert_eq!(products.len(), 5);
        assert_eq!(products[0].id, 1);
        assert_eq!(products[0].name, "Laptop");
        assert!(products.iter().all(|p| p.in_stock));
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let catalog = MemoryCatalog::sample();

        assert_eq!(catalog.get_by_id(4).await.unwrap().name, "Monitor");
        assert!(matches!(
            catalog.get_by_id(99).await,
            Err(CatalogError::NotFound(99))
        ));
    }

    #[tokio::test]
    async fn test_create_assigns_next_id() {
        let catalog = MemoryCatalog::sample();
        let created = catalog
            .create(NewProduct::new("Webcam", dec!(59.9), "Electronics"))
            .await
            .unwrap();

        assert_eq!(created.id, 6);
        assert_eq!(catalog.list_all().await.unwrap().last(), Some(&created));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid() {
        let catalog = MemoryCatalog::new();
        let result = catalog.create(NewProduct::new("", dec!(5), "X")).await;

        assert!(matches!(result, Err(CatalogError::InvalidProduct(_))));
        assert!(catalog.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stats() {
        let empty = MemoryCatalog::new().stats().await.unwrap();
        assert_eq!(empty.total_count, 0);
        assert_eq!(empty.average_price, Decimal::ZERO);

        let catalog = MemoryCatalog::with_products(vec![
            NewProduct::new("A", dec!(1000), "X").into_product(1),
            NewProduct::new("B", dec!(1501), "X").into_product(2),
        ]);
        let stats = catalog.stats().await.unwrap();
        assert_eq!(stats.total_count, 2);
        assert_eq!(stats.average_price, dec!(1250.5));
    }
}
