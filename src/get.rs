//! Product lookup by id from the command line.
//!
//! Used by `catalog get <id>`: opens its own connection, prints the product
//! as pretty JSON, and closes the connection again.

use anyhow::{Context, Result};
use catalog_core::CatalogError;
use tracing::error;

use crate::config::Config;
use crate::db;

/// CLI entry point: fetch one product and print it to stdout.
pub async fn run_get(config: &Config, id: i64) -> Result<()> {
    let connection = db::connect(config)
        .await
        .context("Failed to connect to the document store")?;
    let repo = connection.repository(config.store.timeout());

    let found = repo.get_product(id).await;

    if let Err(e) = connection.teardown(config.store.timeout()).await {
        error!(error = %e, "store connection was not closed cleanly");
    }

    match found {
        Ok(product) => {
            println!("{}", serde_json::to_string_pretty(&product)?);
            Ok(())
        }
        Err(CatalogError::NotFound(id)) => anyhow::bail!("product not found: {}", id),
        Err(e) => Err(e).context("Failed to look up product"),
    }
}
