//! # Catalog Service
//!
//! A read-only product catalog served over HTTP from a MongoDB database.
//! On boot the service seeds each empty collection with a fixed sample set,
//! so a fresh database serves useful data immediately.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────────────┐   ┌───────────────┐   ┌─────────┐
//! │  config  │──▶│ db (Connection) │──▶│ CatalogRepo   │◀──│  HTTP   │
//! │ env+TOML │   │ establish/ping  │   │ seed + reads  │   │ (axum)  │
//! └──────────┘   └─────────────────┘   └───────┬───────┘   └─────────┘
//!                                              ▼
//!                                        ┌───────────┐
//!                                        │  MongoDB  │
//!                                        └───────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! MONGODB_URI=mongodb://localhost:27017 catalog serve
//! catalog seed                  # seed empty collections and exit
//! catalog get 3                 # print one product
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML + environment configuration |
//! | [`db`] | Store connection lifecycle |
//! | [`mongo_store`] | MongoDB `DocumentStore` backend |
//! | [`server`] | HTTP routes and bootstrap |
//! | [`seed`] | `catalog seed` command |
//! | [`get`] | `catalog get` command |

pub mod config;
pub mod db;
pub mod get;
pub mod mongo_store;
pub mod seed;
pub mod server;
