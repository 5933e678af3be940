//! Catalog repository: typed reads over `products` and `categories`, plus
//! seed-if-empty population.
//!
//! Every store call gets its own timeout window; the timeout is the only way
//! an in-flight call is abandoned. Nothing here retries. Failures come back as
//! a [`CatalogError`] and the caller decides what to do with them.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bson::{doc, Document};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::CatalogError;
use crate::fixtures;
use crate::models::{Category, Product};
use crate::store::DocumentStore;

pub const PRODUCTS: &str = "products";
pub const CATEGORIES: &str = "categories";

/// Per-call bound applied to every store operation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// What [`CatalogRepository::seed_if_empty`] inserted. Zero means the
/// collection already held data and was left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub products_inserted: u64,
    pub categories_inserted: u64,
}

/// Read-plus-seed access to the catalog.
///
/// Cheap to clone; clones share the same store handle.
#[derive(Clone)]
pub struct CatalogRepository {
    store: Arc<dyn DocumentStore>,
    timeout: Duration,
}

impl CatalogRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// All products, in whatever order the store returns them.
    ///
    /// One undecodable document fails the whole call.
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let docs = self
            .bounded("find products", self.store.find(PRODUCTS, doc! {}))
            .await
            .map_err(CatalogError::Query)?;
        decode_all(PRODUCTS, docs)
    }

    /// The product whose public `id` equals `id`.
    pub async fn get_product(&self, id: i64) -> Result<Product, CatalogError> {
        let found = self
            .bounded(
                "find product",
                self.store.find_one(PRODUCTS, doc! { "id": id }),
            )
            .await
            .map_err(CatalogError::Query)?;
        match found {
            Some(document) => decode(PRODUCTS, document),
            None => Err(CatalogError::NotFound(id)),
        }
    }

    /// All categories, in whatever order the store returns them.
    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let docs = self
            .bounded("find categories", self.store.find(CATEGORIES, doc! {}))
            .await
            .map_err(CatalogError::Query)?;
        decode_all(CATEGORIES, docs)
    }

    /// Populate each collection with its fixture set if, and only if, the
    /// collection is empty right now.
    ///
    /// Products and categories are handled independently: a populated or
    /// failing products step does not stop the categories step. Any failure
    /// is reported as [`CatalogError::Seed`] once both steps have run.
    ///
    /// The count-then-insert sequence is not atomic. Two processes seeding
    /// the same empty store at once can both insert.
    pub async fn seed_if_empty(&self) -> Result<SeedReport, CatalogError> {
        let mut report = SeedReport::default();
        let mut failures = Vec::new();

        match self.seed_collection(PRODUCTS, fixtures::products()).await {
            Ok(inserted) => report.products_inserted = inserted,
            Err(e) => failures.push(e),
        }
        match self.seed_collection(CATEGORIES, fixtures::categories()).await {
            Ok(inserted) => report.categories_inserted = inserted,
            Err(e) => failures.push(e),
        }

        if failures.is_empty() {
            Ok(report)
        } else {
            Err(CatalogError::Seed(failures.join("; ")))
        }
    }

    async fn seed_collection<T: Serialize>(
        &self,
        collection: &str,
        fixture: serde_json::Result<Vec<T>>,
    ) -> Result<u64, String> {
        let existing = self
            .bounded(&format!("count {}", collection), self.store.count(collection))
            .await?;
        if existing > 0 {
            debug!(collection, existing, "collection already populated, skipping seed");
            return Ok(0);
        }

        let records =
            fixture.map_err(|e| format!("{} fixture is malformed: {}", collection, e))?;
        let docs = records
            .iter()
            .map(|record| bson::to_document(record))
            .collect::<Result<Vec<Document>, _>>()
            .map_err(|e| format!("encoding {} fixture: {}", collection, e))?;
        let expected = docs.len() as u64;

        let inserted = self
            .bounded(
                &format!("insert {}", collection),
                self.store.insert_many(collection, docs),
            )
            .await?;
        if inserted != expected {
            return Err(format!(
                "inserted {} of {} {} fixtures",
                inserted, expected, collection
            ));
        }

        info!(collection, inserted, "seeded empty collection");
        Ok(inserted)
    }

    async fn bounded<T, F>(&self, operation: &str, call: F) -> Result<T, String>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(format!("{}: {:#}", operation, e)),
            Err(_) => Err(format!(
                "{} timed out after {}ms",
                operation,
                self.timeout.as_millis()
            )),
        }
    }
}

fn decode<T: DeserializeOwned>(collection: &str, document: Document) -> Result<T, CatalogError> {
    bson::from_document(document)
        .map_err(|e| CatalogError::Query(format!("malformed document in {}: {}", collection, e)))
}

fn decode_all<T: DeserializeOwned>(
    collection: &str,
    docs: Vec<Document>,
) -> Result<Vec<T>, CatalogError> {
    docs.into_iter().map(|d| decode(collection, d)).collect()
}
