//! HTTP surface: `PUT`/`GET` on the blob store, a health probe, and an admin
//! endpoint for the memstore's hot-swappable runtime knobs.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes as AxumBytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use eigenda_proxy_backend::{MemstoreBackend, MemstoreRuntimeConfig};
use eigenda_proxy_core::StorageManager;
use eigenda_proxy_types::ProxyError;
use serde::Deserialize;

pub struct AppState {
    pub manager: StorageManager<MemstoreBackend>,
    pub memstore: Arc<MemstoreBackend>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/put", post(put_blob))
        .route("/get/{commitment}", get(get_blob))
        .route("/health", get(health))
        .route("/memstore/config", post(update_memstore_config))
        .with_state(state)
}

struct ApiError(ProxyError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match self.0.derivation_body() {
            Some(body) => (status, Json(body)).into_response(),
            None => (status, self.0.to_string()).into_response(),
        }
    }
}

impl From<ProxyError> for ApiError {
    fn from(e: ProxyError) -> Self {
        ApiError(e)
    }
}

async fn put_blob(
    State(state): State<Arc<AppState>>,
    body: AxumBytes,
) -> Result<impl IntoResponse, ApiError> {
    let envelope = state.manager.put(body.into()).await?;
    Ok((StatusCode::OK, format!("0x{}", hex::encode(envelope))))
}

async fn get_blob(
    State(state): State<Arc<AppState>>,
    Path(commitment): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let envelope = hex::decode(commitment.trim_start_matches("0x"))
        .map_err(|e| ApiError(ProxyError::BadRequest(format!("malformed hex commitment: {e}"))))?;
    let blob = state.manager.get(&envelope).await?;
    Ok((StatusCode::OK, blob.to_vec()))
}

async fn health(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    state.manager.health_check().await?;
    Ok(StatusCode::OK)
}

#[derive(Debug, Deserialize)]
struct MemstoreConfigUpdate {
    blob_expiration_seconds: u64,
    put_latency_ms: u64,
    get_latency_ms: u64,
}

async fn update_memstore_config(
    State(state): State<Arc<AppState>>,
    Json(update): Json<MemstoreConfigUpdate>,
) -> impl IntoResponse {
    state.memstore.update_config(MemstoreRuntimeConfig {
        blob_expiration: Duration::from_secs(update.blob_expiration_seconds),
        put_latency: Duration::from_millis(update.put_latency_ms),
        get_latency: Duration::from_millis(update.get_latency_ms),
    });
    StatusCode::OK
}
