//! Object operation handlers

use super::{authorization, respond};
use crate::gateway::{TempUrlRequest, UploadRequest};
use crate::{ApiError, AppState};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use swiftgate_core::metadata::object_meta_header;

/// POST /objects/upload (multipart)
pub async fn upload_object(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    WithRejection(multipart, _): WithRejection<Multipart, ApiError>,
) -> Result<Response, ApiError> {
    let request = read_upload_form(multipart).await?;
    let outcome = state.gateway.upload(authorization(&headers), request).await?;

    Ok((
        StatusCode::CREATED,
        respond(
            "Object uploaded successfully",
            json!({
                "container": outcome.container,
                "objectName": outcome.object_name,
                "size": outcome.size,
                "contentType": outcome.content_type,
                "etag": outcome.result.etag,
                "url": outcome.result.url,
            }),
        ),
    )
        .into_response())
}

/// Collect the `file`, `container`, `objectName`, `contentType` and `metadata` parts
async fn read_upload_form(mut multipart: Multipart) -> Result<UploadRequest, ApiError> {
    let mut request = UploadRequest::default();
    let mut file_content_type = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::invalid_argument(format!("invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                file_content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::invalid_argument(format!("failed to read file: {}", e)))?;
                request.data = Some(data);
            }
            "container" => request.container = text_field(field).await?,
            "objectName" => request.object_name = text_field(field).await?,
            "contentType" => {
                request.content_type = Some(text_field(field).await?).filter(|ct| !ct.is_empty());
            }
            "metadata" => {
                let raw = text_field(field).await?;
                if !raw.trim().is_empty() {
                    let metadata: HashMap<String, String> = serde_json::from_str(&raw).map_err(|e| {
                        ApiError::invalid_argument(format!(
                            "metadata must be a JSON object of strings: {}",
                            e
                        ))
                    })?;
                    request.metadata = Some(metadata);
                }
            }
            other => tracing::debug!("Ignoring multipart field {}", other),
        }
    }

    request.content_type = request
        .content_type
        .or(file_content_type.filter(|ct| !ct.is_empty()));
    Ok(request)
}

async fn text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::invalid_argument(format!("invalid form field: {}", e)))
}

/// GET /objects/download/{container}/{*object}
pub async fn download_object(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    WithRejection(Path((container, object_name)), _): WithRejection<Path<(String, String)>, ApiError>,
) -> Result<Response, ApiError> {
    let object = state
        .gateway
        .download(authorization(&headers), &container, &object_name)
        .await?;

    let mut response_headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&object.content_type) {
        response_headers.insert(header::CONTENT_TYPE, value);
    }
    response_headers.insert(header::CONTENT_LENGTH, HeaderValue::from(object.data.len()));
    response_headers.insert(header::CONTENT_DISPOSITION, content_disposition(&object_name));
    if let Some(value) = object.etag.as_deref().and_then(|e| HeaderValue::from_str(e).ok()) {
        response_headers.insert(header::ETAG, value);
    }

    for (key, value) in &object.metadata {
        let name = HeaderName::try_from(object_meta_header(key));
        let value = HeaderValue::from_str(value);
        if let (Ok(name), Ok(value)) = (name, value) {
            response_headers.insert(name, value);
        }
    }

    Ok((StatusCode::OK, response_headers, object.data).into_response())
}

/// `attachment; filename="<last path segment>"`, or bare `attachment` when the name is not header-safe
fn content_disposition(object_name: &str) -> HeaderValue {
    let file_name = object_name.rsplit('/').next().unwrap_or(object_name).replace('"', "");
    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file_name))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// GET /objects/info/{container}/{*object}
pub async fn object_info(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    WithRejection(Path((container, object_name)), _): WithRejection<Path<(String, String)>, ApiError>,
) -> Result<Response, ApiError> {
    let meta = state
        .gateway
        .stat(authorization(&headers), &container, &object_name)
        .await?;

    Ok(respond(
        "Object info retrieved successfully",
        json!({
            "container": container,
            "objectName": meta.name,
            "size": meta.size,
            "lastModified": meta.last_modified,
            "contentType": meta.content_type,
            "hash": meta.hash,
            "metadata": meta.metadata,
        }),
    )
    .into_response())
}

/// DELETE /objects/{container}/{*object}
pub async fn delete_object(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    WithRejection(Path((container, object_name)), _): WithRejection<Path<(String, String)>, ApiError>,
) -> Result<Response, ApiError> {
    state
        .gateway
        .delete(authorization(&headers), &container, &object_name)
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct ListObjectsParams {
    pub prefix: Option<String>,
    pub limit: Option<i64>,
}

/// GET /objects/list/{container}
pub async fn list_objects(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    WithRejection(Path(container), _): WithRejection<Path<String>, ApiError>,
    WithRejection(Query(params), _): WithRejection<Query<ListObjectsParams>, ApiError>,
) -> Result<Response, ApiError> {
    let objects = state
        .gateway
        .list(
            authorization(&headers),
            &container,
            params.prefix.as_deref(),
            params.limit,
        )
        .await?;

    Ok(respond(
        "Objects retrieved successfully",
        json!({
            "container": container,
            "count": objects.len(),
            "objects": objects,
        }),
    )
    .into_response())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempUrlBody {
    pub container: String,
    pub object_name: String,
    pub expires_in_seconds: i64,
    #[serde(default)]
    pub method: Option<String>,
}

/// POST /objects/temp-url
pub async fn generate_temp_url(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<TempUrlBody>, ApiError>,
) -> Result<Response, ApiError> {
    let grant = state
        .gateway
        .temp_url(TempUrlRequest {
            container: body.container,
            object_name: body.object_name,
            expires_in_seconds: body.expires_in_seconds,
            method: body.method,
        })
        .await?;

    Ok(respond(
        "Temporary URL generated successfully",
        json!({
            "container": grant.container,
            "objectName": grant.object_name,
            "tempUrl": grant.url,
            "expiresAt": grant.expires_at().map(|t| t.to_rfc3339()),
            "method": grant.method,
        }),
    )
    .into_response())
}

/// GET /objects/health
pub async fn storage_health(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let status = state.gateway.check_connection(authorization(&headers)).await?;
    Ok(respond("Health check completed", status).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            content_disposition("reports/2024/q1.pdf"),
            "attachment; filename=\"q1.pdf\""
        );
        assert_eq!(content_disposition("a\"b.txt"), "attachment; filename=\"ab.txt\"");
        assert_eq!(content_disposition("bad\nname.txt"), "attachment");
    }
}
