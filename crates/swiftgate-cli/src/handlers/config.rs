//! Backend configuration handlers

use super::respond;
use crate::{ApiError, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use swiftgate_core::{BackendConfig, BackendConfigPatch, NewBackendConfig};

/// A configuration as shown to callers; credentials and the signing key are never exposed
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
    pub id: String,
    pub name: String,
    pub auth_url: Option<String>,
    pub storage_url: String,
    pub tenant_name: String,
    pub has_temp_url_key: bool,
    pub is_active: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BackendConfig> for ConfigView {
    fn from(config: BackendConfig) -> Self {
        Self {
            has_temp_url_key: config.temp_url_key.as_deref().is_some_and(|k| !k.is_empty()),
            id: config.id,
            name: config.name,
            auth_url: config.auth_url,
            storage_url: config.storage_url,
            tenant_name: config.tenant_name,
            is_active: config.is_active,
            description: config.description,
            created_at: config.created_at,
            updated_at: config.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListConfigParams {
    /// Include inactive records
    #[serde(default)]
    pub all: bool,
}

/// POST /swift/config
pub async fn create_config(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(new), _): WithRejection<Json<NewBackendConfig>, ApiError>,
) -> Result<Response, ApiError> {
    let config = state.resolver().create(new).await?;

    Ok((
        StatusCode::CREATED,
        respond("Swift configuration created successfully", ConfigView::from(config)),
    )
        .into_response())
}

/// GET /swift/config
pub async fn list_configs(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(params), _): WithRejection<Query<ListConfigParams>, ApiError>,
) -> Result<Response, ApiError> {
    let configs: Vec<ConfigView> = state
        .resolver()
        .list(!params.all)
        .await?
        .into_iter()
        .map(ConfigView::from)
        .collect();

    Ok(respond("Swift configurations retrieved successfully", configs).into_response())
}

/// GET /swift/config/active/current
pub async fn get_active_config(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let config = state.resolver().resolve_active().await?;
    Ok(respond(
        "Active Swift configuration retrieved successfully",
        ConfigView::from(config),
    )
    .into_response())
}

/// GET /swift/config/{id}
pub async fn get_config(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<String>, ApiError>,
) -> Result<Response, ApiError> {
    let config = state.resolver().resolve_by_id(&id).await?;
    Ok(respond("Swift configuration retrieved successfully", ConfigView::from(config)).into_response())
}

/// PUT /swift/config/{id}
pub async fn update_config(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<String>, ApiError>,
    Json(patch): Json<BackendConfigPatch>,
) -> Result<Response, ApiError> {
    let config = state.resolver().update(&id, patch).await?;
    Ok(respond("Swift configuration updated successfully", ConfigView::from(config)).into_response())
}

/// DELETE /swift/config/{id}
pub async fn delete_config(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<String>, ApiError>,
) -> Result<Response, ApiError> {
    state.resolver().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
