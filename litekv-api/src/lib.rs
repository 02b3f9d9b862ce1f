//! # litekv-api
//!
//! Thin `axum` adapters over `litekv-cache` and `litekv-store`: request
//! envelopes, rate limiting, CORS, and validation-as-precondition. Neither
//! router touches the core's internals beyond the public methods on
//! `CacheEngine`/`StoreManager` — this crate only renders them over HTTP.

mod cache_routes;
mod error_mapping;
mod rate_limit;
mod store_routes;

pub use cache_routes::{router as cache_router, CacheAppState};
pub use rate_limit::{with_rate_limiting, RateLimiter};
pub use store_routes::{router as store_router, StoreAppState};

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::CorsLayer;

/// Builds the complete cache server router: routes, permissive CORS (as
/// the reference architecture's own REST layer does), and a per-IP rate
/// limiter.
pub fn build_cache_server(state: Arc<CacheAppState>, max_requests: u32, window: Duration) -> Router {
    let limiter = Arc::new(RateLimiter::new(max_requests, window));
    with_rate_limiting(cache_router(state), limiter).layer(CorsLayer::permissive())
}

/// Builds the complete store server router, with the same CORS and
/// rate-limiting treatment as the cache server.
pub fn build_store_server(state: Arc<StoreAppState>, max_requests: u32, window: Duration) -> Router {
    let limiter = Arc::new(RateLimiter::new(max_requests, window));
    with_rate_limiting(store_router(state), limiter).layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use litekv_cache::{CacheConfig, CacheEngine};
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_endpoint_reports_success_envelope() {
        let state = Arc::new(CacheAppState {
            cache: Arc::new(Mutex::new(CacheEngine::new(CacheConfig::default()))),
            storage: None,
        });
        let app = build_cache_server(state, 100, Duration::from_secs(60));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_key_returns_not_found_with_no_storage_configured() {
        let state = Arc::new(CacheAppState {
            cache: Arc::new(Mutex::new(CacheEngine::new(CacheConfig::default()))),
            storage: None,
        });
        let app = build_cache_server(state, 100, Duration::from_secs(60));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/keys/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_then_get_then_update_then_delete_through_the_router() {
        let state = Arc::new(CacheAppState {
            cache: Arc::new(Mutex::new(CacheEngine::new(CacheConfig::default()))),
            storage: None,
        });
        let app = build_cache_server(state, 100, Duration::from_secs(60));

        let create = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/keys")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"key":"u","value":{"n":1}}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(create.status(), StatusCode::CREATED);

        let get = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/keys/u")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(get.status(), StatusCode::OK);

        let update = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/keys/u")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"value":{"n":2}}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(update.status(), StatusCode::OK);

        let update_missing = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/keys/missing")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"value":{"n":2}}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(update_missing.status(), StatusCode::NOT_FOUND);

        let delete = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/keys/u")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(delete.status(), StatusCode::OK);

        let delete_again = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/keys/u")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(delete_again.status(), StatusCode::NOT_FOUND);
    }
}
