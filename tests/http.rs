//! HTTP contract tests.
//!
//! Each test runs the real router on an ephemeral port against an in-memory
//! store and talks to it over TCP with `reqwest`.

use anyhow::{bail, Result};
use async_trait::async_trait;
use bson::Document;
use catalog_core::store::memory::InMemoryStore;
use catalog_core::store::DocumentStore;
use catalog_core::CatalogRepository;
use catalog_service::server::serve;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

// ─── Harness ────────────────────────────────────────────────────────

struct TestServer {
    base: String,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<Result<()>>,
}

impl TestServer {
    async fn start(repo: CatalogRepository) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let (stop, stopped) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve(listener, repo, async move {
            stopped.await.ok();
        }));
        Self { base, stop, handle }
    }

    async fn seeded() -> Self {
        let repo = CatalogRepository::new(Arc::new(InMemoryStore::new()));
        repo.seed_if_empty().await.unwrap();
        Self::start(repo).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        reqwest::get(self.url(path)).await.unwrap()
    }

    async fn stop(self) {
        self.stop.send(()).ok();
        self.handle.await.unwrap().unwrap();
    }
}

/// Every call fails as if the store dropped the connection.
struct BrokenStore;

#[async_trait]
impl DocumentStore for BrokenStore {
    async fn find(&self, _collection: &str, _filter: Document) -> Result<Vec<Document>> {
        bail!("connection reset by peer")
    }

    async fn find_one(&self, _collection: &str, _filter: Document) -> Result<Option<Document>> {
        bail!("connection reset by peer")
    }

    async fn count(&self, _collection: &str) -> Result<u64> {
        bail!("connection reset by peer")
    }

    async fn insert_many(&self, _collection: &str, _docs: Vec<Document>) -> Result<u64> {
        bail!("connection reset by peer")
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_products() {
    let server = TestServer::seeded().await;

    let resp = server.get("/products").await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let products = body.as_array().unwrap();
    assert_eq!(products.len(), 6);
    assert!(products.iter().all(|p| p.get("_id").is_none()));

    server.stop().await;
}

#[tokio::test]
async fn test_get_product_by_id() {
    let server = TestServer::seeded().await;

    let resp = server.get("/products/3").await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["id"], 3);
    assert_eq!(body["name"], "Smart Watch");
    assert_eq!(body["categoryId"], 1);
    assert_eq!(body["featured"], true);

    server.stop().await;
}

#[tokio::test]
async fn test_reviews_key_presence() {
    let server = TestServer::seeded().await;

    let shirt: Value = server.get("/products/4").await.json().await.unwrap();
    assert_eq!(shirt["name"], "Designer T-shirt");
    let shirt = shirt.as_object().unwrap();
    assert!(!shirt.contains_key("reviews"));
    assert!(!shirt.contains_key("featured"));

    let phone: Value = server.get("/products/1").await.json().await.unwrap();
    let comments: Vec<&str> = phone["reviews"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["comment"].as_str().unwrap())
        .collect();
    assert_eq!(
        comments,
        vec![
            "Best phone I've ever owned. The battery life is incredible!",
            "Great phone, but a bit expensive.",
            "Excellent camera quality and fast performance.",
        ]
    );

    server.stop().await;
}

#[tokio::test]
async fn test_unknown_product_is_404() {
    let server = TestServer::seeded().await;

    let resp = server.get("/products/999").await;
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "not_found");

    server.stop().await;
}

#[tokio::test]
async fn test_non_integer_id_is_400() {
    let server = TestServer::seeded().await;

    for path in ["/products/abc", "/products/1.5", "/products/99999999999999999999"] {
        let resp = server.get(path).await;
        assert_eq!(resp.status(), 400, "{}", path);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], "bad_request");
    }

    server.stop().await;
}

#[tokio::test]
async fn test_list_categories() {
    let server = TestServer::seeded().await;

    let resp = server.get("/products/categories").await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["Electronics", "Clothing", "Home & Garden", "Books", "Toys"]
    );

    server.stop().await;
}

#[tokio::test]
async fn test_health_probes() {
    let server = TestServer::seeded().await;

    for path in ["/health/live", "/health/ready"] {
        let resp = server.get(path).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.text().await.unwrap(), "OK");
    }

    server.stop().await;
}

#[tokio::test]
async fn test_empty_store_serves_empty_lists() {
    let server = TestServer::start(CatalogRepository::new(Arc::new(InMemoryStore::new()))).await;

    let body: Value = server.get("/products").await.json().await.unwrap();
    assert_eq!(body, serde_json::json!([]));
    assert_eq!(server.get("/products/1").await.status(), 404);

    server.stop().await;
}

#[tokio::test]
async fn test_store_failure_is_500() {
    let repo = CatalogRepository::new(Arc::new(BrokenStore));
    let server = TestServer::start(repo).await;

    for path in ["/products", "/products/categories", "/products/1"] {
        let resp = server.get(path).await;
        assert_eq!(resp.status(), 500, "{}", path);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], "internal");
        let message = body["error"]["message"].as_str().unwrap();
        assert!(
            !message.contains("connection reset"),
            "store details leaked: {}",
            message
        );
    }

    assert_eq!(server.get("/health/ready").await.status(), 200);

    server.stop().await;
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let server = TestServer::seeded().await;

    let resp = reqwest::Client::new()
        .get(server.url("/products"))
        .header("Origin", "http://shop.example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    drop(resp);

    server.stop().await;
}

#[tokio::test]
async fn test_graceful_shutdown() {
    let server = TestServer::seeded().await;
    let base = server.base.clone();
    server.stop().await;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    assert!(client.get(format!("{}/health/live", base)).send().await.is_err());
}
