//! Error kinds surfaced by the catalog.

use thiserror::Error;

/// The closed set of failures a caller of the catalog can observe.
///
/// The HTTP layer branches on the variant to pick a status code; it never
/// inspects the message.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The store connection could not be opened, verified, or closed.
    #[error("connection error: {0}")]
    Connection(String),

    /// A read failed: network, timeout, or a document that does not decode.
    #[error("query error: {0}")]
    Query(String),

    /// A point lookup matched no product.
    #[error("product not found: {0}")]
    NotFound(i64),

    /// Seeding failed part way through.
    #[error("seed error: {0}")]
    Seed(String),
}

impl CatalogError {
    /// Short machine-readable name for logs and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::Connection(_) => "connection",
            CatalogError::Query(_) => "query",
            CatalogError::NotFound(_) => "not_found",
            CatalogError::Seed(_) => "seed",
        }
    }
}
