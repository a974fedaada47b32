//! HTTP route definitions

use crate::{handlers, middleware, AppState};
use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main router
pub fn create_router(state: Arc<AppState>) -> Router {
    let rate_limit = state.rate_limit.clone();
    let prefix = state.config.route_prefix();
    let cors_enabled = state.config.cors_enabled;
    let max_body_size = state.config.max_body_size;

    let api = Router::new()
        // Service endpoints
        .route("/", get(handlers::api_info))
        .route("/health", get(handlers::health_check))

        // Configuration endpoints
        .route(
            "/swift/config",
            post(handlers::create_config).get(handlers::list_configs),
        )
        .route("/swift/config/active/current", get(handlers::get_active_config))
        .route(
            "/swift/config/{id}",
            get(handlers::get_config)
                .put(handlers::update_config)
                .delete(handlers::delete_config),
        )

        // Object endpoints
        .route("/objects/upload", post(handlers::upload_object))
        .route("/objects/download/{container}/{*object}", get(handlers::download_object))
        .route("/objects/info/{container}/{*object}", get(handlers::object_info))
        .route("/objects/list/{container}", get(handlers::list_objects))
        .route("/objects/temp-url", post(handlers::generate_temp_url))
        .route("/objects/health", get(handlers::storage_health))
        .route("/objects/{container}/{*object}", delete(handlers::delete_object))

        // Container endpoints
        .route(
            "/objects/containers",
            post(handlers::create_container).get(handlers::list_containers),
        )
        .with_state(state);

    let router = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(&prefix, api)
    };

    // Outermost last: request id wraps logging, which wraps rate limiting
    let router = router
        .layer(axum_middleware::from_fn_with_state(
            rate_limit,
            middleware::rate_limit_middleware,
        ))
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware));

    let router = if cors_enabled {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
    } else {
        router
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(max_body_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GatewayConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn router() -> Router {
        let state = AppState::new(GatewayConfig::default()).unwrap();
        create_router(Arc::new(state))
    }

    async fn call(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_under_prefix() {
        let (status, body) = call(router(), get("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, _) = call(router(), get("/health")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_no_active_config_is_not_found() {
        let (status, body) = call(router(), get("/api/v1/swift/config/active/current")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NoActiveConfig");
        assert!(body["error"]["requestId"].is_string());
    }

    #[tokio::test]
    async fn test_object_routes_require_bearer() {
        let (status, body) = call(router(), get("/api/v1/objects/containers")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "InvalidCredentialFormat");
    }

    #[tokio::test]
    async fn test_request_id_header() {
        let response = router().oneshot(get("/api/v1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_error_body_shares_request_id_with_header() {
        let response = router()
            .oneshot(get("/api/v1/swift/config/active/current"))
            .await
            .unwrap();
        let header_id = response.headers()["x-request-id"].to_str().unwrap().to_string();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["requestId"], header_id.as_str());
    }

    #[tokio::test]
    async fn test_rate_limited_response_is_json() {
        let mut config = GatewayConfig::default();
        config.rate_limit_rps = 1;
        let router = create_router(Arc::new(AppState::new(config).unwrap()));

        let (status, _) = call(router.clone(), get("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = call(router, get("/api/v1/health")).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"]["code"], "SlowDown");
    }

    #[rstest::rstest]
    #[case(Request::builder().uri("/api/v1/objects/list/docs?limit=abc"))]
    #[case(Request::builder()
        .method("POST")
        .uri("/api/v1/objects/containers")
        .header("content-type", "application/json"))]
    #[case(Request::builder()
        .method("POST")
        .uri("/api/v1/objects/temp-url")
        .header("content-type", "application/json"))]
    #[case(Request::builder()
        .method("POST")
        .uri("/api/v1/swift/config")
        .header("content-type", "application/json"))]
    #[tokio::test]
    async fn test_extractor_rejections_use_error_body(#[case] builder: axum::http::request::Builder) {
        let request = builder.body(Body::from("{not json")).unwrap();
        let (status, body) = call(router(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "InvalidArgument");
        assert!(body["error"]["requestId"].is_string());
    }

    #[tokio::test]
    async fn test_create_and_fetch_config() {
        let router = router();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/swift/config")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"name":"primary","storageUrl":"http://store","tenantName":"T1","password":"p","tempUrlKey":"k"}"#,
            ))
            .unwrap();

        let (status, body) = call(router.clone(), request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["isActive"], true);
        assert_eq!(body["data"]["hasTempUrlKey"], true);
        assert!(body["data"].get("password").is_none());

        let id = body["data"]["id"].as_str().unwrap().to_string();
        let (status, body) = call(router, get(&format!("/api/v1/swift/config/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "primary");
    }
}
