//! Connection manager for the document store.
//!
//! A [`Connection`] is opened once by whoever boots the process, handed to
//! the repository as a [`MongoStore`], and torn down once by the same owner.
//! Neither operation retries; both are bounded by a timeout.

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use bson::doc;
use catalog_core::{CatalogError, CatalogRepository};
use mongodb::{Client, Database};
use tracing::info;

use crate::config::Config;
use crate::mongo_store::MongoStore;

/// A verified, process-wide handle to one database on the store.
pub struct Connection {
    client: Client,
    database: Database,
}

/// Open a client for `uri` and ping the server, all within `timeout`.
///
/// Fails with [`CatalogError::Connection`] if the URI is unusable, the ping
/// is rejected, or the whole sequence does not finish in time.
pub async fn establish(
    uri: &str,
    database: &str,
    timeout: Duration,
) -> Result<Connection, CatalogError> {
    let open_and_ping = async {
        let client = Client::with_uri_str(uri).await?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok::<_, mongodb::error::Error>(client)
    };

    let client = match tokio::time::timeout(timeout, open_and_ping).await {
        Ok(Ok(client)) => client,
        Ok(Err(e)) => {
            return Err(CatalogError::Connection(format!(
                "could not connect to store: {}",
                e
            )))
        }
        Err(_) => {
            return Err(CatalogError::Connection(format!(
                "store did not answer ping within {}ms",
                timeout.as_millis()
            )))
        }
    };

    info!(database, "connected to document store");
    Ok(Connection {
        database: client.database(database),
        client,
    })
}

/// [`establish`] using the resolved store settings from `config`.
pub async fn connect(config: &Config) -> Result<Connection, CatalogError> {
    establish(
        config.store.uri(),
        &config.store.database,
        config.store.timeout(),
    )
    .await
}

impl Connection {
    /// A [`DocumentStore`](catalog_core::store::DocumentStore) over this
    /// connection's database.
    pub fn store(&self) -> MongoStore {
        MongoStore::new(self.database.clone())
    }

    /// A repository sharing this connection, with `timeout` applied to each
    /// store call.
    pub fn repository(&self, timeout: Duration) -> CatalogRepository {
        CatalogRepository::new(Arc::new(self.store())).with_timeout(timeout)
    }

    /// Close the client. Consumes the handle, so it can only happen once.
    pub async fn teardown(self, timeout: Duration) -> Result<(), CatalogError> {
        let Connection { client, database } = self;
        drop(database);

        bounded_shutdown(client.shutdown().into_future(), timeout).await?;

        info!("disconnected from document store");
        Ok(())
    }
}

async fn bounded_shutdown<F>(shutdown: F, timeout: Duration) -> Result<(), CatalogError>
where
    F: Future<Output = ()>,
{
    tokio::time::timeout(timeout, shutdown).await.map_err(|_| {
        CatalogError::Connection(format!(
            "store did not acknowledge disconnect within {}ms",
            timeout.as_millis()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_shutdown_past_deadline_is_connection_error() {
        let started = Instant::now();
        let result =
            bounded_shutdown(std::future::pending::<()>(), Duration::from_millis(100)).await;

        match result {
            Err(CatalogError::Connection(message)) => {
                assert!(message.contains("100ms"), "unexpected message: {}", message)
            }
            other => panic!("expected a connection error, got {:?}", other),
        }
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_shutdown_within_deadline_is_ok() {
        assert!(bounded_shutdown(async {}, Duration::from_secs(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_teardown_idle_client() {
        // The driver connects lazily, so no server is needed until the first operation.
        let client = Client::with_uri_str("mongodb://127.0.0.1:1").await.unwrap();
        let connection = Connection {
            database: client.database("insecurazon"),
            client,
        };

        connection.teardown(Duration::from_secs(5)).await.unwrap();
    }
}
