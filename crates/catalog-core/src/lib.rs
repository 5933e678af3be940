//! # Catalog Core
//!
//! Models, seed fixtures, the document store abstraction, and the catalog
//! repository that sits between the HTTP layer and the store.
//!
//! This crate knows nothing about MongoDB, HTTP, or configuration. The
//! service crate supplies a [`store::DocumentStore`] backed by a live
//! database; tests use [`store::memory::InMemoryStore`].

pub mod error;
pub mod fixtures;
pub mod models;
pub mod repository;
pub mod store;

pub use error::CatalogError;
pub use repository::{CatalogRepository, SeedReport};
