//! Error Types for the Product Catalog

use agent_core::AgentError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Product with ID {0} not found")]
    NotFound(u64),

    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored product is corrupt: {0}")]
    Corrupt(String),
}

impl From<CatalogError> for AgentError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidProduct(msg) => Self::ToolValidation(msg),
            other => Self::ToolExecution(other.to_string()),
        }
    }
}
