use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use litekv_core::{key::validate_key, Envelope, Value};
use litekv_store::StoreManager;
use serde::Deserialize;

use crate::error_mapping::error_response;

pub struct StoreAppState {
    pub manager: Arc<StoreManager>,
}

#[derive(Debug, Deserialize)]
struct SaveDataRequest {
    value: serde_json::Value,
}

async fn health() -> impl IntoResponse {
    Json(Envelope::ok("healthy"))
}

async fn get_stats(State(state): State<Arc<StoreAppState>>) -> Response {
    match state.manager.store().get_stats().await {
        Ok(stats) => Json(Envelope::ok(stats)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn get_data(State(state): State<Arc<StoreAppState>>, Path(key): Path<String>) -> Response {
    if let Err(err) = validate_key(&key) {
        return error_response(err);
    }
    match state.manager.read(&key).await {
        Ok(Some(entry)) => Json(Envelope::ok(entry)).into_response(),
        Ok(None) => error_response(litekv_core::Error::NotFound),
        Err(err) => error_response(err),
    }
}

async fn save_data(
    State(state): State<Arc<StoreAppState>>,
    Path(key): Path<String>,
    Json(body): Json<SaveDataRequest>,
) -> Response {
    if let Err(err) = validate_key(&key) {
        return error_response(err);
    }
    let value = Value::from_json(body.value);
    match state.manager.save(&key, value).await {
        Ok(entry) => Json(Envelope::ok(entry)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn delete_data(State(state): State<Arc<StoreAppState>>, Path(key): Path<String>) -> Response {
    if let Err(err) = validate_key(&key) {
        return error_response(err);
    }
    match state.manager.delete(&key).await {
        Ok(deleted) => Json(Envelope::ok(deleted)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn backup(State(state): State<Arc<StoreAppState>>) -> Response {
    match state.manager.backup_now().await {
        Ok(path) => Json(Envelope::ok(path.display().to_string())).into_response(),
        Err(err) => error_response(err),
    }
}

async fn compact(State(state): State<Arc<StoreAppState>>) -> Response {
    match state.manager.compact().await {
        Ok(count) => Json(Envelope::ok(count)).into_response(),
        Err(err) => error_response(err),
    }
}

/// Builds the store HTTP router. Callers add CORS and rate-limiting layers
/// on top.
pub fn router(state: Arc<StoreAppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/storage", get(get_stats))
        .route("/api/stats", get(get_stats))
        .route(
            "/api/data/:key",
            get(get_data).post(save_data).delete(delete_data),
        )
        .route("/api/backup", post(backup))
        .route("/api/compact", post(compact))
        .with_state(state)
}
