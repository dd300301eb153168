//! Service banner and unknown-route fallback

use axum::Json;
use serde_json::{json, Value};

use super::ApiError;

/// GET /
pub async fn service_info() -> Json<Value> {
    Json(json!({
        "message": "Worship Group API - worship team management",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ["/auth/login", "/members", "/music", "/scales", "/health"],
    }))
}

/// Fallback for any path no route matches
pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}
