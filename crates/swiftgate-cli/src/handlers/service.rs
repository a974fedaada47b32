//! Service-level handlers

use axum::{response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

const SERVICE_NAME: &str = "Swiftgate Object Storage API";

/// GET / - Service info
pub async fn api_info() -> impl IntoResponse {
    Json(json!({
        "name": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Gateway to Swift-compatible object storage",
        "endpoints": {
            "health": "/health",
            "objects": "/objects",
            "swift": "/swift",
        },
    }))
}

/// GET /health - Liveness
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
