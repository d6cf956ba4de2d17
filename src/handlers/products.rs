use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{StatusCode, Uri},
    Json,
};
use serde_json::json;
use tracing::info;

use crate::{
    error::{OperationContext, OperationError},
    models::{parse_product, ProductId},
    AppState,
};

type HandlerResult = Result<(StatusCode, Json<serde_json::Value>), OperationError>;

/// The id is the segment right after the route prefix; anything further is
/// ignored and an absent segment yields an empty (invalid) id.
fn id_segment(uri: &Uri) -> &str {
    uri.path().split('/').nth(2).unwrap_or_default()
}

fn message(status: StatusCode, text: &str) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(json!({ "message": text })))
}

// ── Add ───────────────────────────────────────────────────────────────────────

pub async fn add_product(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> HandlerResult {
    const FAILED: &str = "Error adding product";

    let body = body.or_fail_with(FAILED)?;
    let product = parse_product(&body).or_fail_with(FAILED)?;

    let start = Instant::now();
    let id = state.store.insert(product).await.or_fail_with(FAILED)?;

    info!(id = %id, elapsed_ms = start.elapsed().as_millis(), "Added product");

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Product added successfully",
            "id": id.to_string(),
        })),
    ))
}

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_products(State(state): State<AppState>) -> HandlerResult {
    let start = Instant::now();
    let products = state
        .store
        .find_all()
        .await
        .or_fail_with("Error fetching products")?;

    info!(
        count = products.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Listed products"
    );

    Ok((StatusCode::OK, Json(json!(products))))
}

// ── Update ────────────────────────────────────────────────────────────────────

pub async fn update_product(
    State(state): State<AppState>,
    uri: Uri,
    body: Result<Bytes, BytesRejection>,
) -> HandlerResult {
    const FAILED: &str = "Error updating product";

    let body = body.or_fail_with(FAILED)?;
    let fields = parse_product(&body).or_fail_with(FAILED)?;
    let id: ProductId = id_segment(&uri).parse().or_fail_with(FAILED)?;

    let start = Instant::now();
    let matched = state
        .store
        .update_partial(&id, fields)
        .await
        .or_fail_with(FAILED)?;

    if matched == 0 {
        info!(id = %id, "Product to update not found");
        return Ok(message(StatusCode::NOT_FOUND, "Product not found"));
    }

    info!(id = %id, elapsed_ms = start.elapsed().as_millis(), "Updated product");
    Ok(message(StatusCode::OK, "Product updated successfully"))
}

// ── Delete ────────────────────────────────────────────────────────────────────

pub async fn delete_product(State(state): State<AppState>, uri: Uri) -> HandlerResult {
    const FAILED: &str = "Error deleting product";

    let id: ProductId = id_segment(&uri).parse().or_fail_with(FAILED)?;

    let start = Instant::now();
    let deleted = state.store.delete(&id).await.or_fail_with(FAILED)?;

    if deleted == 0 {
        info!(id = %id, "Product to delete not found");
        return Ok(message(StatusCode::NOT_FOUND, "Product not found"));
    }

    info!(id = %id, elapsed_ms = start.elapsed().as_millis(), "Deleted product");
    Ok(message(StatusCode::OK, "Product deleted successfully"))
}
