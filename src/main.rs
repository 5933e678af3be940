//! # Catalog CLI (`catalog`)
//!
//! Runs the catalog HTTP service and a couple of maintenance commands
//! against the same store.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `catalog serve` | Connect, seed empty collections, serve HTTP |
//! | `catalog seed` | Seed empty collections and exit |
//! | `catalog get <id>` | Print one product as JSON |
//!
//! The store URI and port come from the environment (`MONGODB_URI`,
//! `MONGODB_SECRET_PATH`, `PORT`), optionally on top of a TOML file passed
//! with `--config`. Log verbosity follows `RUST_LOG` (default `info`).

use catalog_service::{config, get, seed, server};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Catalog service: a read-only product catalog over HTTP.
#[derive(Parser)]
#[command(
    name = "catalog",
    about = "Catalog service: a read-only product catalog over HTTP",
    version
)]
struct Cli {
    /// Path to an optional configuration file (TOML).
    ///
    /// Environment variables override values from the file.
    #[arg(long, global = true, env = "CATALOG_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Connects to the store (exits if that fails), seeds any empty
    /// collection, then serves until Ctrl-C or SIGTERM.
    Serve,

    /// Seed empty collections with the sample catalog and exit.
    ///
    /// Collections that already hold any document are left untouched, so
    /// running this repeatedly is safe.
    Seed,

    /// Print a product by its id.
    Get {
        /// Product id.
        id: i64,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let cfg = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Seed => {
            seed::run_seed(&cfg).await?;
        }
        Commands::Get { id } => {
            get::run_get(&cfg, id).await?;
        }
    }

    Ok(())
}
