//! HTTP request handlers

pub mod config;
pub mod container;
pub mod object;
pub mod service;

pub use config::*;
pub use container::*;
pub use object::*;
pub use service::*;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum::Json;
use serde::Serialize;

/// Standard success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// `{"message": ..., "data": ...}`
pub fn respond<T: Serialize>(message: impl Into<String>, data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        message: message.into(),
        data: Some(data),
    })
}

/// Raw `Authorization` header value, if readable
pub(crate) fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}
