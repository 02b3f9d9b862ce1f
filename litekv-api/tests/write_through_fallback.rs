//! End-to-end: drives the actual cache HTTP router (not the engine
//! directly) through the write-through + fallback-populate scenario.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use litekv_api::{build_cache_server, CacheAppState};
use litekv_cache::{CacheConfig, CacheEngine};
use litekv_client::{InProcessStorageClient, StorageClient};
use litekv_store::{PartitionedStore, StoreManager, StoreManagerConfig};
use tokio::sync::Mutex;
use tower::ServiceExt;

async fn build_storage() -> (Arc<dyn StorageClient>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(PartitionedStore::new(dir.path()));
    store.initialize().await.unwrap();
    let manager = Arc::new(StoreManager::new(store, StoreManagerConfig::default()));
    (Arc::new(InProcessStorageClient::new(manager)), dir)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn set_persist_then_fallback_populates_and_a_plain_get_then_hits_the_cache() {
    let (storage, _dir) = build_storage().await;
    let state = Arc::new(CacheAppState {
        cache: Arc::new(Mutex::new(CacheEngine::new(CacheConfig::default()))),
        storage: Some(storage),
    });
    let app = build_cache_server(state, 1_000, Duration::from_secs(60));

    let create = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/keys")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"key":"u","value":{"n":1},"persist":true}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(create.status(), StatusCode::CREATED);

    let clear = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/cache")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(clear.status(), StatusCode::OK);

    // No fallback: the cache was just cleared, so this must miss.
    let miss = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/keys/u")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(miss.status(), StatusCode::NOT_FOUND);

    // Fallback populates from storage.
    let fallback = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/keys/u?fallback=true")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(fallback.status(), StatusCode::OK);
    let fallback_body = body_json(fallback).await;
    assert_eq!(fallback_body["data"], serde_json::json!({"n": 1}));

    // Proof of populate: a plain GET (no fallback) now hits the cache.
    let repeat = app
        .oneshot(
            Request::builder()
                .uri("/api/keys/u")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(repeat.status(), StatusCode::OK);
    let repeat_body = body_json(repeat).await;
    assert_eq!(repeat_body["data"], serde_json::json!({"n": 1}));
}

#[tokio::test]
async fn cache_miss_with_no_storage_backing_stays_a_miss() {
    let state = Arc::new(CacheAppState {
        cache: Arc::new(Mutex::new(CacheEngine::new(CacheConfig::default()))),
        storage: None,
    });
    let app = build_cache_server(state, 1_000, Duration::from_secs(60));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/keys/never-set?fallback=true")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_key_removes_it_from_both_cache_and_storage() {
    let (storage, _dir) = build_storage().await;
    let state = Arc::new(CacheAppState {
        cache: Arc::new(Mutex::new(CacheEngine::new(CacheConfig::default()))),
        storage: Some(storage.clone()),
    });
    let app = build_cache_server(state, 1_000, Duration::from_secs(60));

    let create = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/keys")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"key":"k","value":1,"persist":true}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(create.status(), StatusCode::CREATED);

    let delete = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/keys/k")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(delete.status(), StatusCode::OK);

    assert!(storage.load("k").await.unwrap().is_none());
}
