pub mod products;

use axum::{
    extract::Request,
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use serde_json::json;

/// Fallback for unknown paths and for known paths hit with the wrong method.
pub async fn endpoint_not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Endpoint not found" })),
    )
}

/// The CORS layer answers every OPTIONS request itself with 200 and the
/// allow-* headers; the API contract for OPTIONS is 204 with no body.
pub async fn preflight_no_content(req: Request, next: Next) -> Response {
    let is_preflight = req.method() == Method::OPTIONS;
    let mut response = next.run(req).await;
    if is_preflight {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}
