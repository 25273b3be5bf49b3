use thiserror::Error;

use crate::domain::{CatalogError, CheckoutError, ProductId};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("Access denied: {username} ({role}) cannot {action}")]
    AccessDenied {
        username: String,
        role: String,
        action: String,
    },

    #[error("No operator is logged in")]
    NotLoggedIn,

    #[error("Recorded revenue exceeds the representable range")]
    RevenueOverflow,

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error(transparent)]
    Catalog(CatalogError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => AppError::ProductNotFound(id),
            other => AppError::Catalog(other),
        }
    }
}
