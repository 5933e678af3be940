//! Canonical seed data.
//!
//! The records live in `fixtures/*.json` and are compiled into the binary.

use crate::models::{Category, Product};

const PRODUCTS_JSON: &str = include_str!("../fixtures/products.json");
const CATEGORIES_JSON: &str = include_str!("../fixtures/categories.json");

/// The six sample products inserted into an empty `products` collection.
pub fn products() -> serde_json::Result<Vec<Product>> {
    serde_json::from_str(PRODUCTS_JSON)
}

/// The five sample categories inserted into an empty `categories` collection.
pub fn categories() -> serde_json::Result<Vec<Category>> {
    serde_json::from_str(CATEGORIES_JSON)
}
