//! HTTP middleware for request ids, logging and rate limiting

use crate::auth::TokenExtractor;
use crate::error::REQUEST_ID_HEADER;
use crate::{ApiError, ErrorCode};
use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use governor::{clock::DefaultClock, state::keyed::DefaultKeyedStateStore, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Rate limiter type
pub type KeyedRateLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Key used for callers without a readable project id
pub const ANONYMOUS_KEY: &str = "anonymous";

/// How often idle rate limiter keys are dropped
pub const LIMITER_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

tokio::task_local! {
    static CURRENT_REQUEST_ID: String;
}

/// Create a rate limiter
pub fn create_rate_limiter(requests_per_second: u32) -> Arc<KeyedRateLimiter> {
    let rps = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
    Arc::new(RateLimiter::keyed(Quota::per_second(rps)))
}

/// Periodically forget keys whose quota has fully replenished
///
/// Keys come from unverified credential claims, so without this the limiter
/// grows with every distinct project id it has seen. The task stops once the
/// limiter is dropped.
pub fn spawn_limiter_cleanup(limiter: &Arc<KeyedRateLimiter>, every: Duration) -> JoinHandle<()> {
    let limiter = Arc::downgrade(limiter);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // First tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(limiter) = limiter.upgrade() else {
                break;
            };
            limiter.retain_recent();
            limiter.shrink_to_fit();
            tracing::debug!(keys = limiter.len(), "Pruned rate limiter state");
        }
    })
}

/// State for [`rate_limit_middleware`]
#[derive(Clone)]
pub struct RateLimit {
    pub limiter: Arc<KeyedRateLimiter>,
    pub extractor: TokenExtractor,
}

impl RateLimit {
    pub fn new(requests_per_second: u32) -> Self {
        Self {
            limiter: create_rate_limiter(requests_per_second),
            extractor: TokenExtractor::new(),
        }
    }

    /// Project id of the caller, or [`ANONYMOUS_KEY`]
    pub fn key_for(&self, auth_header: Option<&str>) -> String {
        auth_header
            .and_then(|h| self.extractor.extract_project_id(h).ok())
            .unwrap_or_else(|| ANONYMOUS_KEY.to_string())
    }
}

/// Rate limiting middleware, keyed by the caller's project
pub async fn rate_limit_middleware(
    State(rate_limit): State<RateLimit>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    let key = rate_limit.key_for(auth_header);

    if rate_limit.limiter.check_key(&key).is_err() {
        tracing::warn!(key = %key, "Rate limit exceeded");
        return Err(ApiError::new(
            ErrorCode::SlowDown,
            "Please reduce your request rate",
        ));
    }

    Ok(next.run(request).await)
}

/// Request ID extension
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Id of the request being handled on this task, if any
pub fn current_request_id() -> Option<String> {
    CURRENT_REQUEST_ID.try_with(Clone::clone).ok()
}

/// Request ID middleware - adds an `x-request-id` header unless the response already has one
///
/// The id is also scoped to the task so error bodies rendered further in
/// report the same value.
pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    request.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = CURRENT_REQUEST_ID
        .scope(request_id.clone(), next.run(request))
        .await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .entry(REQUEST_ID_HEADER)
            .or_insert(value);
    }
    response
}

/// Logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        "Request completed"
    );

    response
}
