//! Catalog data models.
//!
//! The same serde shape is used for the stored document and for the JSON
//! returned over HTTP, so field names are identical in both places. Optional
//! fields are omitted entirely when they hold their zero value; consumers
//! read a missing key as "not set".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Attribute name to attribute value. Ordering carries no meaning.
pub type Specifications = BTreeMap<String, String>;

/// A customer review embedded in a [`Product`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub user_name: String,
    pub rating: f64,
    pub comment: String,
}

/// A catalog product.
///
/// `id` is the public, externally stable key. It is unrelated to the `_id`
/// the document store assigns, which is ignored on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub image: String,
    pub description: String,
    pub category_id: i64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub full_description: String,
    #[serde(default, skip_serializing_if = "is_zero_f64")]
    pub rating: f64,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub review_count: u32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub specifications: Specifications,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviews: Vec<Review>,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero_f64(value: &f64) -> bool {
    *value == 0.0
}

fn is_zero_u32(value: &u32) -> bool {
    *value == 0
}
