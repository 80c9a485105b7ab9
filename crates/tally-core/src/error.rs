use thiserror::Error;
use uuid::Uuid;

/// Per-product detail attached to an insufficient-stock rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockShortfall {
    pub product_id: Uuid,
    pub product_name: String,
    pub requested: i64,
    pub available: i64,
}

/// Error type that captures common engine failures.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
    /// Soft condition: the caller may retry with explicit confirmation, after
    /// which negative stock is permitted.
    #[error("Insufficient stock for {} product(s)", .0.len())]
    InsufficientStock(Vec<StockShortfall>),
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(Uuid),
    #[error("Member not found: {0}")]
    MemberNotFound(Uuid),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Storage error: {0}")]
    Storage(String),
}
