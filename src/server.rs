//! Catalog HTTP server.
//!
//! Serves read-only catalog data as JSON. Every handler is a thin call into
//! the shared [`CatalogRepository`]; the only decision made here is which
//! status code a [`CatalogError`] becomes.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/products` | All products |
//! | `GET`  | `/products/{id}` | One product by its public id |
//! | `GET`  | `/products/categories` | All categories |
//! | `GET`  | `/health/live` | Liveness probe, plain `OK` |
//! | `GET`  | `/health/ready` | Readiness probe, plain `OK` |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "product 999 not found" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).
//! Store failure details are logged, never returned to the client.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use std::future::Future;

use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use catalog_core::models::{Category, Product};
use catalog_core::{CatalogError, CatalogRepository};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{error, info, warn, Level};

use crate::config::Config;
use crate::db;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    repo: CatalogRepository,
}

/// Starts the catalog service and blocks until shutdown.
///
/// Connects to the store (failure is fatal), seeds empty collections
/// (failure is logged and ignored), serves HTTP until Ctrl-C or SIGTERM,
/// then closes the store connection.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let connection = db::connect(config)
        .await
        .context("Failed to connect to the document store")?;
    let repo = connection.repository(config.store.timeout());

    match repo.seed_if_empty().await {
        Ok(report) => info!(
            products = report.products_inserted,
            categories = report.categories_inserted,
            "seed check complete"
        ),
        Err(e) => warn!(error = %e, "failed to seed initial data"),
    }

    let bind_addr = config.server.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("catalog server listening on http://{}", bind_addr);

    let served = serve(listener, repo, shutdown_signal()).await;

    if let Err(e) = connection.teardown(config.store.timeout()).await {
        error!(error = %e, "store connection was not closed cleanly");
    }

    served
}

/// Serves the catalog routes on an already-bound listener until `shutdown`
/// resolves.
pub async fn serve<F>(listener: TcpListener, repo: CatalogRepository, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(repo))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("catalog server stopped");
    Ok(())
}

/// The catalog router with request tracing and permissive CORS.
pub fn router(repo: CatalogRepository) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/products", get(handle_list_products))
        .route("/products/categories", get(handle_list_categories))
        .route("/products/{id}", get(handle_get_product))
        .route("/health/live", get(handle_health))
        .route("/health/ready", get(handle_health))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(AppState { repo })
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl-C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

/// Inner error detail with a machine-readable code and human-readable message.
#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

/// Maps a repository failure to a response. Only a missed point lookup is a
/// client-visible 404; everything else is logged and becomes a 500.
fn classify_catalog_error(action: &str, err: CatalogError) -> AppError {
    match err {
        CatalogError::NotFound(id) => not_found(format!("product {} not found", id)),
        other => {
            error!(action, kind = other.kind(), error = %other, "catalog request failed");
            internal(format!("failed to {}", action))
        }
    }
}

// ============ Handlers ============

async fn handle_health() -> &'static str {
    "OK"
}

async fn handle_list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = state
        .repo
        .list_products()
        .await
        .map_err(|e| classify_catalog_error("get products", e))?;
    Ok(Json(products))
}

/// Rejects a non-integer id with 400 before touching the store.
async fn handle_get_product(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Product>, AppError> {
    let id: i64 = raw_id
        .parse()
        .map_err(|_| bad_request(format!("invalid product id: {}", raw_id)))?;
    let product = state
        .repo
        .get_product(id)
        .await
        .map_err(|e| classify_catalog_error("get product", e))?;
    Ok(Json(product))
}

async fn handle_list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = state
        .repo
        .list_categories()
        .await
        .map_err(|e| classify_catalog_error("get categories", e))?;
    Ok(Json(categories))
}
