//! One-shot seeding from the command line.
//!
//! `catalog seed` runs the same seed-if-empty check the server runs at boot,
//! prints what it inserted, and exits. Safe to run repeatedly.

use anyhow::{Context, Result};
use tracing::error;

use crate::config::Config;
use crate::db;

pub async fn run_seed(config: &Config) -> Result<()> {
    let connection = db::connect(config)
        .await
        .context("Failed to connect to the document store")?;
    let repo = connection.repository(config.store.timeout());

    let outcome = repo.seed_if_empty().await;

    if let Err(e) = connection.teardown(config.store.timeout()).await {
        error!(error = %e, "store connection was not closed cleanly");
    }

    let report = outcome.context("Seeding failed")?;
    println!("Seed check complete.");
    println!("  products inserted:   {}", report.products_inserted);
    println!("  categories inserted: {}", report.categories_inserted);
    if report.products_inserted == 0 && report.categories_inserted == 0 {
        println!("  (both collections already held data)");
    }

    Ok(())
}
