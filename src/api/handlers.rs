//! API Handlers
//!
//! HTTP request handlers for peer fetches and the JSON endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::group::{Group, GroupRegistry};
use crate::models::{GetResponse, HealthResponse, StatsResponse};
use crate::transport::protocol::{encode_response, normalize_base_path};
use crate::transport::{FetchRequest, FetchResponse, CONTENT_TYPE, DEFAULT_BASE_PATH};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Groups served by this node
    pub registry: Arc<GroupRegistry>,
    /// Prefix peer requests arrive under, normalized to `/.../`
    pub base_path: String,
}

impl AppState {
    /// Creates a new AppState serving peers under the default base path.
    pub fn new(registry: Arc<GroupRegistry>) -> Self {
        Self::with_base_path(registry, DEFAULT_BASE_PATH)
    }

    pub fn with_base_path(registry: Arc<GroupRegistry>, base_path: &str) -> Self {
        Self {
            registry,
            base_path: normalize_base_path(base_path),
        }
    }

    fn group(&self, name: &str) -> Result<Arc<Group>> {
        self.registry
            .get_group(name)
            .ok_or_else(|| CacheError::GroupNotFound(name.to_string()))
    }
}

/// Handler for GET {base_path}:group/:key
///
/// Serves a peer from the local cache or loader only, never forwarding to
/// another peer. Replies with an encoded [`FetchResponse`].
pub async fn peer_handler(
    State(state): State<AppState>,
    Path(request): Path<FetchRequest>,
) -> Result<Response> {
    debug!(group = %request.group, key = %request.key, "peer request");

    let group = state.group(&request.group)?;
    let value = group.get_local(&request.key).await?;

    let body = encode_response(&FetchResponse::new(value.to_vec()))
        .map_err(|e| CacheError::Internal(e.to_string()))?;

    Ok(([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response())
}

/// Handler for GET /api/:group/:key
///
/// Full lookup, routed to the owning peer when there is one.
pub async fn get_handler(
    State(state): State<AppState>,
    Path((group, key)): Path<(String, String)>,
) -> Result<Json<GetResponse>> {
    let value = state.group(&group)?.get(&key).await?;
    Ok(Json(GetResponse::new(group, key, &value)))
}

/// Handler for GET /stats/:group
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(group): Path<String>,
) -> Result<Json<StatsResponse>> {
    let stats = state.group(&group)?.stats();
    Ok(Json(StatsResponse::new(group, stats)))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.registry.names()))
}

/// Fallback for unmatched routes, including peer requests with an empty key.
pub async fn not_found_handler(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("no route for {}", uri.path()) })),
    )
}
