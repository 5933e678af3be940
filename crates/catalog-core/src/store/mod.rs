//! Document store abstraction.
//!
//! The [`DocumentStore`] trait is the narrow slice of a document database the
//! catalog needs: find, find-one, count, and batch insert over named
//! collections of schemaless BSON documents. Decoding into typed models is the
//! caller's job, so every backend hands back raw [`Document`]s.
//!
//! Implementations must be `Send + Sync`; a single instance is shared by every
//! request task for the life of the process.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use bson::Document;

/// Abstract document store backend.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`find`](DocumentStore::find) | All documents matching a filter, in store order |
/// | [`find_one`](DocumentStore::find_one) | First document matching a filter |
/// | [`count`](DocumentStore::count) | Number of documents in a collection |
/// | [`insert_many`](DocumentStore::insert_many) | Insert a batch, returning how many landed |
///
/// Filters are equality matches on top-level fields, e.g. `doc! { "id": 3_i64 }`.
/// An empty filter matches everything.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>>;

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>>;

    async fn count(&self, collection: &str) -> Result<u64>;

    /// Insert `docs` in order. A failure part way through is returned as an
    /// error; documents inserted before it are not rolled back.
    async fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<u64>;
}
