//! In-memory [`DocumentStore`] implementation for tests and local runs.
//!
//! Collections are `Vec<Document>` behind a `std::sync::RwLock`, so insertion
//! order is the store order. Like a real document database, inserts receive an
//! `_id` when they do not carry one.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document};

use super::DocumentStore;

/// In-memory store.
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, expected)| match doc.get(key) {
        Some(actual) => values_equal(actual, expected),
        None => false,
    })
}

/// Equality as the server applies it: numbers compare by value across
/// Int32, Int64 and Double; everything else compares exactly.
fn values_equal(actual: &Bson, expected: &Bson) -> bool {
    match (as_number(actual), as_number(expected)) {
        (Some(a), Some(b)) => a == b,
        _ => actual == expected,
    }
}

#[derive(PartialEq)]
enum Number {
    Int(i64),
    Float(f64),
}

fn as_number(value: &Bson) -> Option<Number> {
    match value {
        Bson::Int32(n) => Some(Number::Int(i64::from(*n))),
        Bson::Int64(n) => Some(Number::Int(*n)),
        Bson::Double(f) if f.fract() == 0.0 && f.abs() < 9.007_199_254_740_992e15 => {
            Some(Number::Int(*f as i64))
        }
        Bson::Double(f) => Some(Number::Float(*f)),
        _ => None,
    }
}

fn poisoned() -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| matches(d, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| matches(d, &filter)).cloned()))
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        Ok(collections.get(collection).map_or(0, |docs| docs.len() as u64))
    }

    async fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<u64> {
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        let stored = collections.entry(collection.to_string()).or_default();
        let inserted = docs.len() as u64;
        for mut doc in docs {
            if !doc.contains_key("_id") {
                doc.insert("_id", ObjectId::new());
            }
            stored.push(doc);
        }
        Ok(inserted)
    }
}
