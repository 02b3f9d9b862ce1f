use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use litekv_cache::CacheEngine;
use litekv_client::StorageClient;
use litekv_core::{key::validate_key, Envelope, Error, Value};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error_mapping::error_response;

/// Shared state for the cache HTTP surface.
///
/// Mirrors the reference architecture's `AppState { query, security }`
/// pattern: one struct holding every `Arc`-shared subsystem a handler
/// might need.
pub struct CacheAppState {
    pub cache: Arc<Mutex<CacheEngine>>,
    /// Present when this deployment can write-through to / fall back to a
    /// durable store; `None` means cache-only, no persistence at all.
    pub storage: Option<Arc<dyn StorageClient>>,
}

#[derive(Debug, Deserialize)]
struct CreateKeyRequest {
    key: String,
    value: serde_json::Value,
    ttl: Option<u64>,
    #[serde(default)]
    persist: bool,
}

#[derive(Debug, Deserialize)]
struct UpdateKeyRequest {
    value: Option<serde_json::Value>,
    ttl: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct FallbackQuery {
    #[serde(default)]
    fallback: bool,
}

async fn health() -> impl IntoResponse {
    Json(Envelope::ok("healthy"))
}

async fn get_stats(State(state): State<Arc<CacheAppState>>) -> impl IntoResponse {
    let stats = state.cache.lock().await.get_stats();
    Json(Envelope::ok(stats))
}

async fn list_keys(State(state): State<Arc<CacheAppState>>) -> impl IntoResponse {
    let keys = state.cache.lock().await.keys();
    Json(Envelope::ok(keys))
}

/// Loads `key` from storage and, if found, populates the cache with it.
/// Shared by the fallback path of `get_key` and the populate step of §8's
/// write-through scenario.
async fn fallback_from_storage(state: &CacheAppState, key: &str) -> Option<Value> {
    let storage = state.storage.as_ref()?;
    match storage.load(key).await {
        Ok(Some(entry)) => {
            let value = entry.value;
            let mut cache = state.cache.lock().await;
            let _ = cache.set(key, value.clone(), None);
            Some(value)
        }
        Ok(None) => None,
        Err(err) => {
            warn!(key, error = %err, "storage fallback failed on cache miss");
            None
        }
    }
}

async fn get_key(
    State(state): State<Arc<CacheAppState>>,
    Path(key): Path<String>,
    Query(query): Query<FallbackQuery>,
) -> Response {
    if let Err(err) = validate_key(&key) {
        return error_response(err);
    }

    if let Some(value) = state.cache.lock().await.get(&key) {
        return Json(Envelope::ok(value.to_json())).into_response();
    }

    if query.fallback {
        if let Some(value) = fallback_from_storage(&state, &key).await {
            return Json(Envelope::ok(value.to_json())).into_response();
        }
    }

    error_response(Error::NotFound)
}

async fn create_key(
    State(state): State<Arc<CacheAppState>>,
    Json(body): Json<CreateKeyRequest>,
) -> Response {
    if let Err(err) = validate_key(&body.key) {
        return error_response(err);
    }
    let value = Value::from_json(body.value);

    let result = state.cache.lock().await.set(&body.key, value.clone(), body.ttl);
    if let Err(err) = result {
        return error_response(err);
    }

    if body.persist {
        if let Some(storage) = &state.storage {
            if let Err(err) = storage.save(&body.key, value).await {
                warn!(key = %body.key, error = %err, "write-through to storage failed");
            }
        }
    }

    (StatusCode::CREATED, Json(Envelope::ok(()))).into_response()
}

async fn update_key(
    State(state): State<Arc<CacheAppState>>,
    Path(key): Path<String>,
    Json(body): Json<UpdateKeyRequest>,
) -> Response {
    if let Err(err) = validate_key(&key) {
        return error_response(err);
    }

    let mut cache = state.cache.lock().await;
    if !cache.has(&key) {
        return error_response(Error::NotFound);
    }

    if let Some(raw_value) = body.value {
        let value = Value::from_json(raw_value);
        let ttl = body.ttl.or_else(|| cache.get_entry(&key).map(|e| e.ttl_seconds));
        if let Err(err) = cache.set(&key, value, ttl) {
            return error_response(err);
        }
    } else if let Some(ttl) = body.ttl {
        if !cache.update_ttl(&key, ttl) {
            return error_response(Error::NotFound);
        }
    }

    (StatusCode::OK, Json(Envelope::ok(()))).into_response()
}

async fn delete_key(State(state): State<Arc<CacheAppState>>, Path(key): Path<String>) -> Response {
    if let Err(err) = validate_key(&key) {
        return error_response(err);
    }
    let deleted = state.cache.lock().await.delete(&key);
    if !deleted {
        return error_response(Error::NotFound);
    }

    if let Some(storage) = &state.storage {
        if let Err(err) = storage.delete(&key).await {
            warn!(key, error = %err, "storage delete failed after cache delete");
        }
    }

    Json(Envelope::ok(deleted)).into_response()
}

async fn clear_cache(State(state): State<Arc<CacheAppState>>) -> impl IntoResponse {
    state.cache.lock().await.clear();
    Json(Envelope::ok(()))
}

/// Builds the cache HTTP router. Callers add CORS and rate-limiting
/// layers (see `crate::rate_limit`) on top.
pub fn router(state: Arc<CacheAppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/stats", get(get_stats))
        .route("/api/keys", get(list_keys).post(create_key))
        .route(
            "/api/keys/:key",
            get(get_key).put(update_key).delete(delete_key),
        )
        .route("/api/cache", delete(clear_cache))
        .with_state(state)
}
