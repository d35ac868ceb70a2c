//! SQLite catalog
//!
//! Products live in a single `products` table. Ids come from SQLite's rowid
//! allocation, which hands out one past the highest id in use, so concurrent
//! creates never collide. Prices are stored as decimal text to stay exact.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};

use super::CatalogStore;
use crate::error::{CatalogError, Result};
use crate::model::{NewProduct, Product};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    price TEXT NOT NULL,
    category TEXT NOT NULL,
    in_stock INTEGER NOT NULL DEFAULT 1
)";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Catalog backed by a SQLite database
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    /// Open (creating if needed) the database at `database_url`, e.g.
    /// `sqlite://products.db` or `sqlite::memory:`.
    pub async fn connect(database_url: &str) -> Result<Self> {
        // Every pooled connection to :memory: would get its own database
        let max_connections = if database_url.contains(":memory:") {
            1
        } else {
            DEFAULT_MAX_CONNECTIONS
        };
        Self::connect_with_settings(database_url, max_connections, 30).await
    }

    pub async fn connect_with_settings(
        database_url: &str,
        max_connections: u32,
        timeout_secs: u64,
    ) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                    sqlx::query("PRAGMA busy_timeout = 5000").execute(&mut *conn).await?;
                    Ok(())
                })
            })
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    /// Use an existing pool, creating the table when absent
    pub async fn with_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Copy the products of a JSON catalog file into an empty database.
    ///
    /// Ids are kept. A database that already holds products is left alone,
    /// so running this at every start imports at most once.
    pub async fn import_json(&self, path: &Path) -> Result<usize> {
        let existing: i64 = sqlx::query("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?
            .try_get(0)?;
        if existing > 0 {
            tracing::debug!(existing, "Database already populated, skipping import");
            return Ok(0);
        }

        let raw = tokio::fs::read_to_string(path).await?;
        let products: Vec<Product> = serde_json::from_str(&raw)?;

        let mut tx = self.pool.begin().await?;
        for product in &products {
            sqlx::query(
                "INSERT INTO products (id, name, price, category, in_stock)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(sql_id(product.id)?)
            .bind(&product.name)
            .bind(product.price.to_string())
            .bind(&product.category)
            .bind(product.in_stock)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        tracing::info!(path = %path.display(), count = products.len(), "Imported catalog file");
        Ok(products.len())
    }
}

fn sql_id(id: u64) -> Result<i64> {
    i64::try_from(id).map_err(|_| CatalogError::InvalidProduct(format!("id {id} is too large")))
}

fn row_to_product(row: &SqliteRow) -> Result<Product> {
    let id: i64 = row.try_get("id")?;
    let price: String = row.try_get("price")?;

    Ok(Product {
        id: u64::try_from(id).map_err(|_| CatalogError::Corrupt(format!("negative id {id}")))?,
        name: row.try_get("name")?,
        price: Decimal::from_str(&price)
            .map_err(|e| CatalogError::Corrupt(format!("price '{price}' of product {id}: {e}")))?,
        category: row.try_get("category")?,
        in_stock: row.try_get("in_stock")?,
    })
}

#[async_trait]
impl CatalogStore for SqliteCatalog {
    async fn list_all(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query("SELECT id, name, price, category, in_stock FROM products ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_product).collect()
    }

    async fn get_by_id(&self, id: u64) -> Result<Product> {
        let Ok(key) = i64::try_from(id) else {
            return Err(CatalogError::NotFound(id));
        };

        let row = sqlx::query("SELECT id, name, price, category, in_stock FROM products WHERE id = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref()
            .map(row_to_product)
            .transpose()?
            .ok_or(CatalogError::NotFound(id))
    }

    async fn create(&self, product: NewProduct) -> Result<Product> {
        product.validate()?;

        let result = sqlx::query("INSERT INTO products (name, price, category, in_stock) VALUES (?, ?, ?, ?)")
            .bind(&product.name)
            .bind(product.price.to_string())
            .bind(&product.category)
            .bind(product.in_stock)
            .execute(&self.pool)
            .await?;

        let id = u64::try_from(result.last_insert_rowid())
            .map_err(|_| CatalogError::Corrupt("negative rowid".into()))?;
        tracing::debug!(id, "Product inserted");
        Ok(product.into_product(id))
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
