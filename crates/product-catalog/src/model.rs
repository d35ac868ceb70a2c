//! Domain Models
//!
//! Uses `rust_decimal` for prices - never use f64 for money! Prices still
//! travel as plain JSON numbers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

/// A catalog entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,

    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    pub category: String,
    pub in_stock: bool,
}

/// Fields for a product that has no id yet
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,

    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    pub category: String,

    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

const fn default_in_stock() -> bool {
    true
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: Decimal, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price,
            category: category.into(),
            in_stock: true,
        }
    }

    /// Reject blank names and negative prices
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::InvalidProduct("name must not be empty".into()));
        }
        if self.price < Decimal::ZERO {
            return Err(CatalogError::InvalidProduct(format!(
                "price must not be negative, got {}",
                self.price
            )));
        }
        Ok(())
    }

    /// Attach an id
    pub fn into_product(self, id: u64) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            category: self.category,
            in_stock: self.in_stock,
        }
    }
}

/// Aggregate figures over the whole catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_count: usize,

    /// Mean price rounded to cents; zero for an empty catalog
    #[serde(with = "rust_decimal::serde::float")]
    pub average_price: Decimal,
}

impl CatalogStats {
    pub fn from_products(products: &[Product]) -> Self {
        let total_count = products.len();
        if total_count == 0 {
            return Self {
                total_count,
                average_price: Decimal::ZERO,
            };
        }

        let total: Decimal = products.iter().map(|p| p.price).sum();
        Self {
            total_count,
            average_price: (total / Decimal::from(total_count)).round_dp(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_product_json_uses_numbers() {
        let product = NewProduct::new("Mouse", dec!(49.99), "Accessories").into_product(3);
        let json = serde_json::to_value(&product).unwrap();

        assert_eq!(json["price"], serde_json::json!(49.99));
        assert_eq!(json["id"], 3);
        assert_eq!(json["in_stock"], true);
    }

    #[test]
    fn test_product_accepts_integer_price() {
        let product: Product = serde_json::from_str(
            r#"{"id": 1, "name": "Laptop", "price": 1000, "category": "Electronics", "in_stock": true}"#,
        )
        .unwrap();
        assert_eq!(product.price, dec!(1000));
    }

    #[test]
    fn test_new_product_validation() {
        assert!(NewProduct::new("Desk", dec!(0), "Furniture").validate().is_ok());
        assert!(NewProduct::new("  ", dec!(10), "Furniture").validate().is_err());
        assert!(matches!(
            NewProduct::new("Desk", dec!(-1), "Furniture").validate(),
            Err(CatalogError::InvalidProduct(_))
        ));
    }

    #[test]
    fn test_stats_empty_catalog() {
        let stats = CatalogStats::from_products(&[]);
        assert_eq!(stats.total_count, 0);
        assert_eq!(stats.average_price, Decimal::ZERO);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["average_price"], serde_json::json!(0.0));
    }

    #[test]
    fn test_stats_rounds_to_cents() {
        let products = [
            NewProduct::new("A", dec!(10), "X").into_product(1),
            NewProduct::new("B", dec!(10), "X").into_product(2),
            NewProduct::new("C", dec!(11), "X").into_product(3),
        ];
        let stats = CatalogStats::from_products(&products);

        assert_eq!(stats.total_count, 3);
        assert_eq!(stats.average_price, dec!(10.33));
    }
}
