//! Container operation handlers

use super::{authorization, respond};
use crate::{ApiError, AppState};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContainerBody {
    pub name: String,
    #[serde(default)]
    pub is_public: bool,
}

/// POST /objects/containers
pub async fn create_container(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    WithRejection(Json(body), _): WithRejection<Json<CreateContainerBody>, ApiError>,
) -> Result<Response, ApiError> {
    state
        .gateway
        .create_container(authorization(&headers), &body.name, body.is_public)
        .await?;

    Ok((
        StatusCode::CREATED,
        respond(
            "Container created successfully",
            json!({ "name": body.name, "isPublic": body.is_public }),
        ),
    )
        .into_response())
}

/// GET /objects/containers
pub async fn list_containers(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let containers = state.gateway.list_containers(authorization(&headers)).await?;

    Ok(respond(
        "Containers retrieved successfully",
        json!({ "count": containers.len(), "containers": containers }),
    )
    .into_response())
}
