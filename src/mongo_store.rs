//! MongoDB-backed [`DocumentStore`] implementation.
//!
//! Each trait method is a single driver call against the named collection.
//! Documents come back untouched; decoding happens in the repository.

use anyhow::Result;
use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::{Collection, Database};

use catalog_core::store::DocumentStore;

/// MongoDB implementation of the [`DocumentStore`] trait.
///
/// Wraps a [`Database`] handle. The driver's client is internally pooled and
/// synchronized, so one instance serves every request.
#[derive(Clone)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection(name)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>> {
        let cursor = self.collection(collection).find(filter).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        Ok(self.collection(collection).find_one(filter).await?)
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        Ok(self.collection(collection).count_documents(doc! {}).await?)
    }

    async fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<u64> {
        let result = self.collection(collection).insert_many(docs).await?;
        Ok(result.inserted_ids.len() as u64)
    }
}
