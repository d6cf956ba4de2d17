use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

mod config;
mod db;
mod error;
mod handlers;
mod models;

use crate::config::Config;
use crate::db::{MongoStore, ProductStore};

/// Shared application state. The store is opened once before serving and
/// never replaced.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProductStore>,
}

impl AppState {
    pub fn new(store: impl ProductStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("info,chocolateshop_inventory=debug")
                }),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    let store = MongoStore::connect(&config)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to connect to MongoDB"))
        .context("Failed to connect to MongoDB")?;

    let app = build_router(AppState::new(store), config.max_body_bytes);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(max_body_bytes = config.max_body_bytes, "Server is running on port {}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    // HEAD is not part of the API; without this `get` would answer it.
    let list = get(handlers::products::list_products)
        .head(handlers::endpoint_not_found)
        .fallback(handlers::endpoint_not_found);
    let update =
        put(handlers::products::update_product).fallback(handlers::endpoint_not_found);
    let remove =
        delete(handlers::products::delete_product).fallback(handlers::endpoint_not_found);

    // Update and delete match on prefix and read the id from the first
    // segment after it, so `/update-product/` (empty id) still reaches the
    // handler and `/delete-product/<id>/extra` acts on `<id>`.
    Router::new()
        .route(
            "/add-product",
            post(handlers::products::add_product).fallback(handlers::endpoint_not_found),
        )
        .route("/products", list)
        .route("/update-product/", update.clone())
        .route("/update-product/*rest", update)
        .route("/delete-product/", remove.clone())
        .route("/delete-product/*rest", remove)
        .fallback(handlers::endpoint_not_found)

        // ── Middleware ──────────────────────────────────────────────────────
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors)
        .layer(middleware::from_fn(handlers::preflight_no_content))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
